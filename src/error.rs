#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown congestion controller {0:?}")]
    UnknownController(String),

    #[error("congestion controller {0:?} is already registered")]
    DuplicateController(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
