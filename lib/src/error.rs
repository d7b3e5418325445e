#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("unable to create image surface: {0}")]
    SurfaceCreate(cairo::Error),
    #[error("error whilst painting surface: {0}")]
    Draw(cairo::Error),
}
