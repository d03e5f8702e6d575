pub mod poll_route;
