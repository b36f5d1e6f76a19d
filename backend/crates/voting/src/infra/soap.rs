//! SOAP Client for the Remote Voting Service
//!
//! Speaks SOAP 1.1 over HTTP: one POST per operation, parameters wrapped in
//! an element named after the operation, results read back from
//! `<{Operation}Result>`.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use reqwest::header::CONTENT_TYPE;

use crate::application::config::RemoteCatalogConfig;
use crate::domain::value_objects::GameId;
use crate::error::{CatalogError, CatalogResult};
use crate::infra::remote::{CatalogServiceClient, RemoteGame};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// HTTP transport for [`CatalogServiceClient`]
#[derive(Debug, Clone)]
pub struct SoapCatalogClient {
    http: reqwest::Client,
    url: String,
    namespace: String,
}

impl SoapCatalogClient {
    pub fn new(config: &RemoteCatalogConfig) -> CatalogResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// POST one operation and return the raw response body
    async fn call(&self, operation: &'static str, params: &[(&str, &str)]) -> CatalogResult<String> {
        let body = build_envelope(&self.namespace, operation, params);

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}{}\"", self.namespace, operation))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(operation, status = status.as_u16(), "Catalog service call");

        if !status.is_success() {
            if let Ok(Some(fault)) = parse_fault(&text) {
                return Err(CatalogError::Fault(fault));
            }
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(text)
    }

    async fn call_flag(&self, operation: &'static str, params: &[(&str, &str)]) -> CatalogResult<bool> {
        let text = self.call(operation, params).await?;
        parse_flag(&text, operation)
    }
}

impl CatalogServiceClient for SoapCatalogClient {
    async fn add_game(&self, title: &str, api_key: &str) -> CatalogResult<bool> {
        self.call_flag("AddGame", &[("title", title), ("apiKey", api_key)])
            .await
    }

    async fn get_games(&self, api_key: &str) -> CatalogResult<Vec<RemoteGame>> {
        let text = self.call("GetGames", &[("apiKey", api_key)]).await?;
        parse_games(&text)
    }

    async fn add_vote(&self, id: GameId, api_key: &str) -> CatalogResult<bool> {
        let id = id.to_string();
        self.call_flag("AddVote", &[("id", id.as_str()), ("apiKey", api_key)])
            .await
    }

    async fn clear_games(&self, api_key: &str) -> CatalogResult<bool> {
        self.call_flag("ClearGames", &[("apiKey", api_key)]).await
    }

    async fn set_got_it(&self, id: GameId, api_key: &str) -> CatalogResult<bool> {
        let id = id.to_string();
        self.call_flag("SetGotIt", &[("id", id.as_str()), ("apiKey", api_key)])
            .await
    }

    async fn check_key(&self, api_key: &str) -> CatalogResult<bool> {
        self.call_flag("CheckKey", &[("apiKey", api_key)]).await
    }
}

/// Build a SOAP 1.1 request envelope
pub fn build_envelope(namespace: &str, operation: &str, params: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in params {
        body.push_str(&format!("<{name}>{}</{name}>", escape(*value)));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="{env}">"#,
            r#"<soap:Body><{op} xmlns="{ns}">{body}</{op}></soap:Body>"#,
            r#"</soap:Envelope>"#,
        ),
        env = SOAP_ENV_NS,
        op = operation,
        ns = escape(namespace),
        body = body,
    )
}

/// Flattened XML, namespaces stripped
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Open(String),
    Text(String),
    Close(String),
}

fn nodes(xml: &str) -> CatalogResult<Vec<Node>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| CatalogError::Protocol(format!("invalid XML: {e}")))?;
        match event {
            Event::Start(e) => nodes.push(Node::Open(local(e.local_name().as_ref()))),
            Event::Empty(e) => {
                let name = local(e.local_name().as_ref());
                nodes.push(Node::Open(name.clone()));
                nodes.push(Node::Close(name));
            }
            Event::End(e) => nodes.push(Node::Close(local(e.local_name().as_ref()))),
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| CatalogError::Protocol(format!("invalid text: {e}")))?;
                nodes.push(Node::Text(text.into_owned()));
            }
            Event::CData(c) => nodes.push(Node::Text(String::from_utf8_lossy(&c).into_owned())),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(nodes)
}

fn local(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Visit every text node together with the name of its enclosing element
fn texts(nodes: &[Node]) -> impl Iterator<Item = (&str, &str)> {
    let mut stack: Vec<&str> = Vec::new();
    nodes.iter().filter_map(move |node| match node {
        Node::Open(name) => {
            stack.push(name);
            None
        }
        Node::Close(_) => {
            stack.pop();
            None
        }
        Node::Text(text) => stack.last().map(|owner| (*owner, text.as_str())),
    })
}

/// `faultstring` of a SOAP fault, if the document is one
fn parse_fault(xml: &str) -> CatalogResult<Option<String>> {
    let nodes = nodes(xml)?;
    if !nodes.iter().any(|n| matches!(n, Node::Open(name) if name == "Fault")) {
        return Ok(None);
    }

    let message = texts(&nodes)
        .find(|(owner, _)| *owner == "faultstring")
        .map(|(_, text)| text.to_string())
        .unwrap_or_else(|| "unspecified fault".to_string());
    Ok(Some(message))
}

/// Boolean carried in `<{operation}Result>`
fn parse_flag(xml: &str, operation: &str) -> CatalogResult<bool> {
    let nodes = nodes(xml)?;
    let element = format!("{operation}Result");

    let raw = texts(&nodes)
        .find(|(owner, _)| *owner == element)
        .map(|(_, text)| text.trim())
        .ok_or_else(|| CatalogError::Protocol(format!("missing <{element}>")))?;

    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CatalogError::Protocol(format!(
            "<{element}> is not a boolean: {other}"
        ))),
    }
}

#[derive(Default)]
struct GameFields {
    id: Option<String>,
    title: String,
    votes: Option<String>,
    status: String,
}

impl GameFields {
    fn build(self) -> CatalogResult<RemoteGame> {
        let number = |field: &str, raw: Option<String>| -> CatalogResult<i64> {
            let raw = raw.ok_or_else(|| CatalogError::Protocol(format!("XboxGame without {field}")))?;
            raw.trim()
                .parse()
                .map_err(|_| CatalogError::Protocol(format!("XboxGame {field} is not a number: {raw}")))
        };

        Ok(RemoteGame {
            id: number("Id", self.id)?,
            title: self.title,
            votes: number("Votes", self.votes)?,
            status: self.status,
        })
    }
}

/// `XboxGame` records of a `GetGames` response
fn parse_games(xml: &str) -> CatalogResult<Vec<RemoteGame>> {
    let nodes = nodes(xml)?;
    if !nodes.iter().any(|n| matches!(n, Node::Open(name) if name == "GetGamesResult")) {
        return Err(CatalogError::Protocol("missing <GetGamesResult>".to_string()));
    }

    let mut games = Vec::new();
    let mut current: Option<GameFields> = None;
    let mut field: Option<&str> = None;

    for node in &nodes {
        match node {
            Node::Open(name) if name == "XboxGame" => current = Some(GameFields::default()),
            Node::Open(name) => field = Some(name.as_str()),
            Node::Close(name) if name == "XboxGame" => {
                if let Some(fields) = current.take() {
                    games.push(fields.build()?);
                }
            }
            Node::Close(_) => field = None,
            Node::Text(text) => {
                let Some(fields) = current.as_mut() else {
                    continue;
                };
                match field {
                    Some("Id") => fields.id.get_or_insert_with(String::new).push_str(text),
                    Some("Title") => fields.title.push_str(text),
                    Some("Votes") => fields.votes.get_or_insert_with(String::new).push_str(text),
                    Some("Status") => fields.status.push_str(text),
                    _ => {}
                }
            }
        }
    }

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>{inner}</soap:Body>
</soap:Envelope>"#
        )
    }

    #[test]
    fn test_envelope_escapes_values() {
        let xml = build_envelope(
            "http://tempuri.org/",
            "AddGame",
            &[("title", "Ratchet & Clank <HD>"), ("apiKey", "k")],
        );

        assert!(xml.contains(r#"<AddGame xmlns="http://tempuri.org/">"#));
        assert!(xml.contains("<title>Ratchet &amp; Clank &lt;HD&gt;</title>"));
        assert!(xml.contains("<apiKey>k</apiKey>"));
    }

    #[test]
    fn test_envelope_round_trips_through_parser() {
        let xml = build_envelope("http://tempuri.org/", "AddGame", &[("title", "A & B")]);
        let titles: Vec<String> = texts(&nodes(&xml).unwrap())
            .filter(|(owner, _)| *owner == "title")
            .map(|(_, text)| text.to_string())
            .collect();
        assert_eq!(titles, vec!["A & B"]);
    }

    #[test]
    fn test_parse_flag() {
        let xml = response(
            r#"<AddVoteResponse xmlns="http://tempuri.org/"><AddVoteResult>true</AddVoteResult></AddVoteResponse>"#,
        );
        assert!(parse_flag(&xml, "AddVote").unwrap());

        let xml = response(
            r#"<SetGotItResponse xmlns="http://tempuri.org/"><SetGotItResult>false</SetGotItResult></SetGotItResponse>"#,
        );
        assert!(!parse_flag(&xml, "SetGotIt").unwrap());
    }

    #[test]
    fn test_parse_flag_missing_result() {
        let xml = response(r#"<AddVoteResponse xmlns="http://tempuri.org/"/>"#);
        assert!(matches!(
            parse_flag(&xml, "AddVote"),
            Err(CatalogError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        let xml = response("<CheckKeyResponse><CheckKeyResult>maybe</CheckKeyResult></CheckKeyResponse>");
        assert!(matches!(
            parse_flag(&xml, "CheckKey"),
            Err(CatalogError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_games() {
        let xml = response(
            r#"<GetGamesResponse xmlns="http://tempuri.org/">
  <GetGamesResult>
    <XboxGame><Id>1</Id><Title>Halo &amp; Friends</Title><Votes>4</Votes><Status>gotit</Status></XboxGame>
    <XboxGame><Id>2</Id><Title>Fable</Title><Votes>1</Votes><Status>wantit</Status></XboxGame>
  </GetGamesResult>
</GetGamesResponse>"#,
        );

        let games = parse_games(&xml).unwrap();
        assert_eq!(
            games,
            vec![
                RemoteGame {
                    id: 1,
                    title: "Halo & Friends".to_string(),
                    votes: 4,
                    status: "gotit".to_string(),
                },
                RemoteGame {
                    id: 2,
                    title: "Fable".to_string(),
                    votes: 1,
                    status: "wantit".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_games_empty_list() {
        let xml = response("<GetGamesResponse><GetGamesResult/></GetGamesResponse>");
        assert!(parse_games(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_games_requires_id() {
        let xml = response(
            "<GetGamesResponse><GetGamesResult><XboxGame><Title>Halo</Title><Votes>1</Votes></XboxGame></GetGamesResult></GetGamesResponse>",
        );
        assert!(matches!(parse_games(&xml), Err(CatalogError::Protocol(_))));
    }

    #[test]
    fn test_parse_fault() {
        let xml = response(
            "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>Invalid API key</faultstring></soap:Fault>",
        );
        assert_eq!(parse_fault(&xml).unwrap(), Some("Invalid API key".to_string()));

        let ok = response("<ClearGamesResponse><ClearGamesResult>true</ClearGamesResult></ClearGamesResponse>");
        assert_eq!(parse_fault(&ok).unwrap(), None);
    }

    #[test]
    fn test_malformed_xml_is_protocol_error() {
        assert!(matches!(
            parse_flag("<a><b></a>", "AddGame"),
            Err(CatalogError::Protocol(_))
        ));
    }
}
