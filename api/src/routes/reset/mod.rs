pub mod reset_route;
