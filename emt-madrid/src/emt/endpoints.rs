//! EMT API endpoint definitions.
//!
//! Every endpoint is immutable static data. Per-request values such as the
//! stop id, credentials or the access token are supplied when the request
//! is built, never written back into these tables.
//!
//! The API answers HTTP 200 even for logical failures and signals them
//! through a `code` field whose meaning depends on the endpoint. Each
//! endpoint therefore has its own code enum.

use std::fmt;

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// A fixed endpoint of the EMT API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Path relative to the base URL. May contain a `{stop_id}` placeholder.
    pub path: &'static str,
}

impl Endpoint {
    /// The endpoint path with `{stop_id}` filled in.
    pub fn path_for(&self, stop_id: u32) -> String {
        self.path.replace("{stop_id}", &stop_id.to_string())
    }
}

/// Login with email and password headers.
pub const LOGIN: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "v1/mobilitylabs/user/login/",
};

/// Full stop detail, including the schedule of every line.
pub const STOP_DETAIL: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "v1/transport/busemtmad/stops/{stop_id}/detail/",
};

/// Stops around a stop, nearest first.
pub const NEARBY_STOPS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "v2/transport/busemtmad/stops/arroundstop/{stop_id}/0/",
};

/// Real-time arrival estimates for a stop.
pub const ARRIVALS: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "v2/transport/busemtmad/stops/{stop_id}/arrives/",
};

/// Header carrying the access token on data endpoints.
pub const ACCESS_TOKEN_HEADER: &str = "accesstoken";

/// Response codes of the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginCode {
    Success,
    InvalidPassword,
    UserNotFound,
    ApiLimitExceeded,
    Other,
}

impl LoginCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "01" => LoginCode::Success,
            "89" => LoginCode::InvalidPassword,
            "92" => LoginCode::UserNotFound,
            "98" => LoginCode::ApiLimitExceeded,
            _ => LoginCode::Other,
        }
    }
}

/// Response codes of the stop-detail endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailCode {
    Retrieved,
    DetailNotAvailable,
    NotFound,
    InvalidToken,
    ApiLimitExceeded,
    Other,
}

impl DetailCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "00" => DetailCode::Retrieved,
            "81" => DetailCode::DetailNotAvailable,
            "90" => DetailCode::NotFound,
            "80" => DetailCode::InvalidToken,
            "98" => DetailCode::ApiLimitExceeded,
            _ => DetailCode::Other,
        }
    }
}

/// Response codes of the nearby-stops endpoint. Anything but `00` means
/// the stop could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearbyCode {
    Retrieved,
    NotFound,
}

impl NearbyCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "00" => NearbyCode::Retrieved,
            _ => NearbyCode::NotFound,
        }
    }
}

/// Response codes of the arrivals endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalsCode {
    Retrieved,
    /// Unknown stop or invalid token; the API uses one code for both.
    NotFound,
    Other,
}

impl ArrivalsCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "00" => ArrivalsCode::Retrieved,
            "80" => ArrivalsCode::NotFound,
            _ => ArrivalsCode::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_substitution() {
        assert_eq!(
            STOP_DETAIL.path_for(72),
            "v1/transport/busemtmad/stops/72/detail/"
        );
        assert_eq!(
            NEARBY_STOPS.path_for(72),
            "v2/transport/busemtmad/stops/arroundstop/72/0/"
        );
        assert_eq!(
            ARRIVALS.path_for(5402),
            "v2/transport/busemtmad/stops/5402/arrives/"
        );
        // No placeholder, nothing to substitute
        assert_eq!(LOGIN.path_for(72), LOGIN.path);
    }

    #[test]
    fn methods() {
        assert_eq!(LOGIN.method, HttpMethod::Get);
        assert_eq!(ARRIVALS.method, HttpMethod::Post);
        assert_eq!(ARRIVALS.method.as_reqwest(), reqwest::Method::POST);
        assert_eq!(HttpMethod::Get.to_string(), "GET");
    }

    #[test]
    fn login_codes() {
        assert_eq!(LoginCode::parse("01"), LoginCode::Success);
        assert_eq!(LoginCode::parse("89"), LoginCode::InvalidPassword);
        assert_eq!(LoginCode::parse("92"), LoginCode::UserNotFound);
        assert_eq!(LoginCode::parse("98"), LoginCode::ApiLimitExceeded);
        assert_eq!(LoginCode::parse("00"), LoginCode::Other);
    }

    #[test]
    fn detail_codes() {
        assert_eq!(DetailCode::parse("00"), DetailCode::Retrieved);
        assert_eq!(DetailCode::parse("81"), DetailCode::DetailNotAvailable);
        assert_eq!(DetailCode::parse("90"), DetailCode::NotFound);
        assert_eq!(DetailCode::parse("80"), DetailCode::InvalidToken);
        assert_eq!(DetailCode::parse("98"), DetailCode::ApiLimitExceeded);
        assert_eq!(DetailCode::parse("42"), DetailCode::Other);
    }

    #[test]
    fn nearby_and_arrival_codes() {
        assert_eq!(NearbyCode::parse("00"), NearbyCode::Retrieved);
        assert_eq!(NearbyCode::parse("01"), NearbyCode::NotFound);
        assert_eq!(ArrivalsCode::parse("00"), ArrivalsCode::Retrieved);
        assert_eq!(ArrivalsCode::parse("80"), ArrivalsCode::NotFound);
        assert_eq!(ArrivalsCode::parse("98"), ArrivalsCode::Other);
    }
}
