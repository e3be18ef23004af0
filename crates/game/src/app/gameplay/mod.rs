mod background;
mod entity;
mod obstacle;
mod player;
mod session;
mod util;

pub(crate) use session::{GameSession, SessionError, CANVAS_HEIGHT, CANVAS_WIDTH};
