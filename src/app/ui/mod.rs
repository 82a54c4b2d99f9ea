mod controls;
mod filters;
mod jump;
mod panels;
