pub mod poll_controller;
