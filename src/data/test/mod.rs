mod confirm;
mod event;
mod player;
