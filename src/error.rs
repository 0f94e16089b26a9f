use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Json(serde_json::Error),

    #[from]
    Kube(kube::Error),

    #[from]
    Infer(kube::config::InferConfigError),

    #[from]
    Io(std::io::Error),

    /// Custom error message
    Custom(String),
}

impl Error {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// True for `NotFound`/`Forbidden` API errors, which existence checks
    /// tolerate while a controller is still provisioning the target object.
    #[must_use]
    pub const fn is_pending_tolerated(&self) -> bool {
        match self {
            Self::Kube(kube::Error::Api(api_error)) => {
                matches!(api_error.code, 403 | 404)
            }
            _ => false,
        }
    }

    /// True if the error is a `NotFound` API response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Kube(kube::Error::Api(api_error)) => api_error.code == 404,
            _ => false,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
