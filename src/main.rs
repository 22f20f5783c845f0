mod app;
mod assets;
mod entity;
mod input;
mod world;

lib_app::app_main!(app::Game);
