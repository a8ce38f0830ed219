use crate::deflate::DeflateError;
use crate::primitives::CipherError;
use std::string::FromUtf8Error;

/// A Bl4 save error
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Bl4Error(#[from] Box<Bl4ErrorKind>);

impl Bl4Error {
    pub(crate) fn new(kind: Bl4ErrorKind) -> Bl4Error {
        Bl4Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &Bl4ErrorKind {
        &self.0
    }
}

impl From<Bl4ErrorKind> for Bl4Error {
    fn from(err: Bl4ErrorKind) -> Self {
        Bl4Error::new(err)
    }
}

/// Specific type of error
#[derive(thiserror::Error, Debug)]
pub enum Bl4ErrorKind {
    #[error("invalid platform identity: user id must not be empty")]
    InvalidIdentity,

    #[error("missing platform identity: a user id is required to derive the save key")]
    MissingIdentity,

    #[error("{missing} primitive is unavailable")]
    PrimitivesUnavailable { missing: &'static str },

    #[error("block cipher failure: {msg}")]
    Cipher { msg: String },

    #[error("unable to compress save: {msg}")]
    Compress { msg: String },

    #[error("unable to decompress save: wrong user ID or unsupported file format")]
    DecompressFailure,

    #[error("pkcs7 padding mismatch (trailing byte: {pad:#x})")]
    PaddingMismatch { pad: u8 },

    #[error("decoded save is not valid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl From<CipherError> for Bl4Error {
    fn from(value: CipherError) -> Self {
        Bl4Error::new(Bl4ErrorKind::Cipher {
            msg: value.to_string(),
        })
    }
}

impl From<DeflateError> for Bl4Error {
    fn from(value: DeflateError) -> Self {
        Bl4Error::new(Bl4ErrorKind::Compress {
            msg: value.to_string(),
        })
    }
}

impl From<FromUtf8Error> for Bl4Error {
    fn from(value: FromUtf8Error) -> Self {
        Bl4Error::from(Bl4ErrorKind::from(value))
    }
}
