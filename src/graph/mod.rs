mod category;
mod derive;
mod edge;
mod neighborhood;

pub use self::category::CategoryClassifier;
pub use self::derive::{LinkDeriver, LinkOptions};
#[cfg(test)]
pub use self::edge::EdgeKey;
pub use self::neighborhood::select_neighborhood;
