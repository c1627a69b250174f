//! Scarer endpoints shared by the integration tests.

#![allow(dead_code)]

use restkit_core::{
    coding_keys, decode_json_response, json_object, GetRequestConfiguration, HttpMethod, HttpResponse,
    JsonInitializable, JsonRepresentable, KeyedJson, RequestConfiguration, RequestContent, RestKitError,
    Session, UrlDomain,
};
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Scarer {
    pub name: String,
    pub nickname: Option<String>,
    pub url: Url,
}

coding_keys! {
    pub enum ScarerKey {
        Name => "name",
        Nickname => "nickname",
        Url => "url",
    }
}

impl JsonInitializable for Scarer {
    fn from_json(json: &Value) -> Result<Self, RestKitError> {
        Ok(Scarer {
            name: json.string_value(&ScarerKey::Name)?,
            nickname: json.string(&ScarerKey::Nickname),
            url: json.url_value(&ScarerKey::Url)?,
        })
    }
}

impl JsonRepresentable for Scarer {
    fn to_json(&self) -> Value {
        let mut pairs = vec![
            (ScarerKey::Name, Value::from(self.name.as_str())),
            (ScarerKey::Url, Value::from(self.url.as_str())),
        ];
        if let Some(nickname) = &self.nickname {
            pairs.push((ScarerKey::Nickname, Value::from(nickname.as_str())));
        }
        json_object(pairs)
    }
}

pub fn scarer(name: &str, nickname: Option<&str>, url: &str) -> Scarer {
    Scarer {
        name: name.to_string(),
        nickname: nickname.map(str::to_string),
        url: Url::parse(url).unwrap(),
    }
}

/// `GET /scarers`, optionally conditional on an ETag.
pub struct GetScarers<S> {
    pub domain: UrlDomain,
    pub session: S,
    pub etag: Option<String>,
}

impl<S: Session> GetRequestConfiguration for GetScarers<S> {
    type Output = Vec<Scarer>;
    type Domain = UrlDomain;
    type Session = S;

    fn domain(&self) -> &UrlDomain {
        &self.domain
    }

    fn api_path(&self) -> &str {
        "scarers"
    }

    fn session(&self) -> &S {
        &self.session
    }

    fn etag(&self) -> Option<String> {
        self.etag.clone()
    }

    fn parse_result(data: &[u8]) -> Result<Vec<Scarer>, RestKitError> {
        Vec::from_slice(data)
    }
}

/// `POST /scarers` with the scarer as a JSON body.
pub struct CreateScarer<S> {
    pub domain: UrlDomain,
    pub session: S,
    pub scarer: Scarer,
}

impl<S: Session> RequestConfiguration for CreateScarer<S> {
    type Output = Scarer;
    type Domain = UrlDomain;
    type Session = S;

    fn domain(&self) -> &UrlDomain {
        &self.domain
    }

    fn api_path(&self) -> &str {
        "scarers"
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn content(&self) -> RequestContent {
        RequestContent::Json(self.scarer.to_json())
    }

    fn session(&self) -> &S {
        &self.session
    }

    fn process_response(response: HttpResponse) -> Result<Scarer, RestKitError> {
        decode_json_response(response)
    }
}

/// `DELETE /scarers/{name}`; succeeds only on 204.
pub struct DeleteScarer<S> {
    pub domain: UrlDomain,
    pub session: S,
    pub path: String,
}

impl<S: Session> DeleteScarer<S> {
    pub fn new(domain: UrlDomain, session: S, name: &str) -> Self {
        Self {
            domain,
            session,
            path: format!("scarers/{name}"),
        }
    }
}

impl<S: Session> RequestConfiguration for DeleteScarer<S> {
    type Output = ();
    type Domain = UrlDomain;
    type Session = S;

    fn domain(&self) -> &UrlDomain {
        &self.domain
    }

    fn api_path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn content(&self) -> RequestContent {
        RequestContent::None
    }

    fn session(&self) -> &S {
        &self.session
    }

    fn process_response(response: HttpResponse) -> Result<(), RestKitError> {
        if response.status == 204 {
            return Ok(());
        }
        Err(RestKitError::UnexpectedCode {
            code: response.status,
            body: response.body,
        })
    }
}

/// Any GET path returning raw text.
pub struct GetText<S> {
    pub domain: UrlDomain,
    pub session: S,
    pub path: String,
}

impl<S: Session> GetRequestConfiguration for GetText<S> {
    type Output = String;
    type Domain = UrlDomain;
    type Session = S;

    fn domain(&self) -> &UrlDomain {
        &self.domain
    }

    fn api_path(&self) -> &str {
        &self.path
    }

    fn session(&self) -> &S {
        &self.session
    }

    fn parse_result(data: &[u8]) -> Result<String, RestKitError> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}
