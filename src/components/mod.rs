pub mod app;
pub mod failure_overlay;
pub mod game_over_overlay;
pub mod game_view;
pub mod home;
pub mod session_panel;
