/// HTTP client for the Whiteout Survival gift-code API
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use serde::Deserialize;

use crate::constants::{WOS_CAPTCHA_URL, WOS_GIFTCODE_URL, WOS_ORIGIN, WOS_PLAYER_INFO_URL};

use super::signing::sign_payload;

/// Errors from the player-info and redemption endpoints
#[derive(Debug)]
pub enum GiftApiError {
    /// Network or HTTP-level error from reqwest
    Network(reqwest::Error),
    /// The API answered but the payload was not the expected shape
    Malformed(String),
    /// The API rejected the request (non-zero code with a message)
    Api { code: i64, msg: String },
}

impl std::fmt::Display for GiftApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GiftApiError::Network(e) => write!(f, "gift-code API unreachable: {}", e),
            GiftApiError::Malformed(msg) => write!(f, "unexpected gift-code API payload: {}", msg),
            GiftApiError::Api { code, msg } => write!(f, "gift-code API error {}: {}", code, msg),
        }
    }
}

impl std::error::Error for GiftApiError {}

/// Errors from the captcha endpoint; all of these are non-fatal to a batch
#[derive(Debug)]
pub enum CaptchaError {
    /// The API throttled the captcha request
    RateLimited,
    /// The API answered without a usable image
    Fetch(String),
    /// Transport or deserialization failure
    Http(String),
}

impl std::fmt::Display for CaptchaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptchaError::RateLimited => write!(f, "captcha requested too frequently"),
            CaptchaError::Fetch(msg) => write!(f, "captcha fetch error: {}", msg),
            CaptchaError::Http(msg) => write!(f, "captcha request failed: {}", msg),
        }
    }
}

impl std::error::Error for CaptchaError {}

/// Player account payload (the API calls this "stove info")
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerInfo {
    pub fid: u64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub stove_lv: i64,
}

#[derive(Deserialize)]
struct PlayerResponse {
    #[serde(default)]
    code: i64,
    data: Option<PlayerInfo>,
    #[serde(default)]
    msg: String,
}

#[derive(Deserialize)]
struct CaptchaResponse {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<CaptchaData>,
}

#[derive(Deserialize)]
struct CaptchaData {
    img: Option<String>,
}

#[derive(Deserialize)]
struct RedeemResponse {
    #[serde(default)]
    err_code: i64,
    #[serde(default)]
    msg: String,
}

/// One redemption session against the vendor API.
///
/// The vendor ties the captcha challenge to cookies set by the player
/// lookup, so the session keeps a cookie store and each account gets a
/// fresh one for its lookup → captcha → redeem sequence.
#[derive(Clone)]
pub struct GiftCodeClient {
    http: reqwest::Client,
}

impl GiftCodeClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http })
    }

    async fn post_signed<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        fields: &[(&str, String)],
    ) -> Result<T, reqwest::Error> {
        let signed = sign_payload(fields);
        self.http
            .post(url)
            .header("accept", "application/json, text/plain, */*")
            .header("origin", WOS_ORIGIN)
            .form(&signed)
            .send()
            .await?
            .json::<T>()
            .await
    }

    /// Look up a player account. The API expects the timestamp in seconds.
    pub async fn player_info(&self, fid: u64) -> Result<PlayerInfo, GiftApiError> {
        let fields = [
            ("fid", fid.to_string()),
            ("time", Utc::now().timestamp().to_string()),
        ];

        let response: PlayerResponse = self
            .post_signed(WOS_PLAYER_INFO_URL, &fields)
            .await
            .map_err(GiftApiError::Network)?;

        classify_player(response)
    }

    /// Fetch a captcha challenge image for an account.
    ///
    /// Returns the decoded image bytes. The API expects the timestamp in
    /// milliseconds here, unlike the player lookup.
    pub async fn fetch_captcha(&self, fid: u64) -> Result<Vec<u8>, CaptchaError> {
        let fields = [
            ("fid", fid.to_string()),
            ("time", Utc::now().timestamp_millis().to_string()),
            ("init", "0".to_string()),
        ];

        let response: CaptchaResponse = self
            .post_signed(WOS_CAPTCHA_URL, &fields)
            .await
            .map_err(|e| CaptchaError::Http(e.to_string()))?;

        if response.code == Some(1)
            && response.msg.as_deref() == Some("CAPTCHA GET TOO FREQUENT.")
        {
            return Err(CaptchaError::RateLimited);
        }

        let img = response
            .data
            .and_then(|data| data.img)
            .ok_or_else(|| CaptchaError::Fetch("no image in response".to_string()))?;

        // The image may arrive as a data URL; strip the prefix when present
        let b64 = match img.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:image") => rest,
            _ => img.as_str(),
        };

        BASE64
            .decode(b64)
            .map_err(|e| CaptchaError::Fetch(format!("image is not valid base64: {}", e)))
    }

    /// Submit a redemption request; returns the API's numeric error code
    /// (absent field decodes as 0) and its message.
    pub async fn redeem(
        &self,
        fid: u64,
        code: &str,
        captcha_code: &str,
    ) -> Result<(i64, String), GiftApiError> {
        let fields = [
            ("fid", fid.to_string()),
            ("cdk", code.to_string()),
            ("captcha_code", captcha_code.to_string()),
            ("time", Utc::now().timestamp_millis().to_string()),
        ];

        let response: RedeemResponse = self
            .post_signed(WOS_GIFTCODE_URL, &fields)
            .await
            .map_err(GiftApiError::Network)?;

        Ok((response.err_code, response.msg))
    }
}

/// A success code without a data payload is a malformed answer, not a
/// rejection
fn classify_player(response: PlayerResponse) -> Result<PlayerInfo, GiftApiError> {
    match response.data {
        Some(info) => Ok(info),
        None if response.code == 0 => {
            Err(GiftApiError::Malformed("player payload has no data".to_string()))
        }
        None => Err(GiftApiError::Api {
            code: response.code,
            msg: response.msg,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captcha_response_rate_limit_shape() {
        let raw = r#"{"code": 1, "msg": "CAPTCHA GET TOO FREQUENT."}"#;
        let response: CaptchaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.code, Some(1));
        assert_eq!(response.msg.as_deref(), Some("CAPTCHA GET TOO FREQUENT."));
        assert!(response.data.is_none());
    }

    #[test]
    fn test_captcha_response_image_shape() {
        let raw = r#"{"code": 0, "msg": "SUCCESS", "data": {"img": "data:image/png;base64,aGk="}}"#;
        let response: CaptchaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.data.unwrap().img.as_deref(),
            Some("data:image/png;base64,aGk=")
        );
    }

    #[test]
    fn test_redeem_response_defaults_missing_err_code_to_zero() {
        let raw = r#"{"msg": "ok"}"#;
        let response: RedeemResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.err_code, 0);
    }

    #[test]
    fn test_new_builds_a_cookie_keeping_session() {
        assert!(GiftCodeClient::new().is_ok());
    }

    #[test]
    fn test_classify_player_success_without_data_is_malformed() {
        let raw = r#"{"code": 0, "msg": "success"}"#;
        let response: PlayerResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            classify_player(response),
            Err(GiftApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_classify_player_rejection_carries_the_api_code() {
        let raw = r#"{"code": 40004, "msg": "USER NOT FOUND"}"#;
        let response: PlayerResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            classify_player(response),
            Err(GiftApiError::Api { code: 40004, .. })
        ));
    }

    #[test]
    fn test_player_response_parses_stove_info() {
        let raw = r#"{"code": 0, "data": {"fid": 123, "nickname": "Chief", "stove_lv": 30}, "msg": "success"}"#;
        let response: PlayerResponse = serde_json::from_str(raw).unwrap();
        let info = response.data.unwrap();
        assert_eq!(info.fid, 123);
        assert_eq!(info.nickname, "Chief");
        assert_eq!(info.stove_lv, 30);
    }
}
