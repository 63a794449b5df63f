/// Which family of endpoint a failed request belonged to.
///
/// Only used to pick the notification wording; member-report queries get a dedicated
/// message when the gateway times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Analytics,
    MemberReport,
    Report,
    Template,
    Taxonomy,
    Survey,
}

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status} {status_text}): {body}")]
    Status {
        kind: RequestKind,
        status: u16,
        status_text: String,
        body: String,
    },

    /// A URL could not be assembled from the base URL and parameters.
    #[error("Invalid URL: {0}")]
    Url(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

const GATEWAY_TIMEOUT: u16 = 504;

impl ApiError {
    /// HTTP status code when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(err) => err.status().map(|s| s.as_u16()),
            ApiError::Url(_) => None,
        }
    }

    /// True for the gateway-timeout class of failures on member-report queries.
    pub fn is_member_report_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                kind: RequestKind::MemberReport,
                status: GATEWAY_TIMEOUT,
                ..
            }
        )
    }

    /// Text for the non-blocking notification shown when a widget fails to load.
    pub fn user_message(&self) -> String {
        if self.is_member_report_timeout() {
            return "The request took too long. Try narrowing the date range or community filter."
                .to_string();
        }
        match self {
            ApiError::Status {
                status,
                status_text,
                ..
            } if !status_text.is_empty() => format!("{status_text} ({status})"),
            ApiError::Status { status, .. } => format!("Request failed ({status})"),
            ApiError::Request(err) if err.is_timeout() => {
                "The request timed out. Please try again.".to_string()
            }
            ApiError::Request(_) => "Unable to reach the server.".to_string(),
            ApiError::Url(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(kind: RequestKind, status: u16, text: &str) -> ApiError {
        ApiError::Status {
            kind,
            status,
            status_text: text.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn member_report_gateway_timeout_gets_dedicated_message() {
        let err = status(RequestKind::MemberReport, 504, "Gateway Timeout");
        assert!(err.is_member_report_timeout());
        assert!(err.user_message().contains("took too long"));
    }

    #[test]
    fn gateway_timeout_elsewhere_uses_status_text() {
        let err = status(RequestKind::Analytics, 504, "Gateway Timeout");
        assert!(!err.is_member_report_timeout());
        assert_eq!(err.user_message(), "Gateway Timeout (504)");
    }

    #[test]
    fn empty_status_text_falls_back_to_code() {
        let err = status(RequestKind::Report, 500, "");
        assert_eq!(err.user_message(), "Request failed (500)");
        assert_eq!(err.status(), Some(500));
    }
}
