use crate::{interp::InterpError, lommel::LommelError, lut::LutError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `lommel` module")]
    Lommel(#[from] LommelError),
    #[error("Error in the `lut` module")]
    Lut(#[from] LutError),
    #[error("Error in the `interp` module")]
    Interp(#[from] InterpError),
}
