pub mod error;

use crate::data::{InteractionData, RequestData, ResponseData};
use error::Error;
use fs::File;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, Write},
    path::Path,
};

lazy_static! {
    static ref HEADER_REGEX: Regex =
        Regex::new(r"(?m)^(?P<header_key>[a-zA-Z0-9\-]+): (?P<header_value>.*?)\s*$").unwrap();
    static ref MARKDOWN_REGEX: Regex = Regex::new(
        "(?ms)\
            ## Interaction (?P<interaction_number>[0-9]+): (?P<http_method>[A-Z]+) (?P<uri>\\S*)\\s*\
            ### Request headers recorded for playback.*?\
            ```\\s*(?P<request_headers_part>.*?)\\s*```.*?\
            ### Request body recorded for playback.*?\
            ```\\s*(?P<request_body_part>.*?)\\s*```.*?\
            ### Response headers recorded for playback.*?\
            ```\\s*(?P<response_headers_part>.*?)\\s*```.*?\
            ### Response body recorded for playback \\((?P<status_code>[0-9]+)[^)]*\\).*?\
            ```\\s*(?P<response_body_part>.*?)\\s*```"
    )
    .unwrap();
}

/// Reads every interaction of a conversation markdown, in order.
pub fn load_markdown<P: AsRef<Path>>(filename: P) -> Result<Vec<InteractionData>, Error> {
    let file_contents = fs::read_to_string(filename)?;
    parse_markdown(&file_contents)
}

pub fn parse_markdown(file_contents: &str) -> Result<Vec<InteractionData>, Error> {
    let mut data = Vec::new();

    for captures in MARKDOWN_REGEX.captures_iter(file_contents) {
        let interaction_number: usize = captures["interaction_number"]
            .parse()
            .map_err(|_| Error::InvalidInteractionNumber)?;
        if interaction_number != data.len() {
            return Err(Error::InteractionOutOfOrder {
                expected: data.len(),
                found: interaction_number,
            });
        }

        let status_code = captures["status_code"]
            .parse()
            .map_err(|_| Error::InvalidStatusCode)?;

        data.push(InteractionData {
            interaction_number,
            request_data: RequestData {
                uri: captures["uri"].into(),
                method: captures["http_method"].into(),
                headers: parse_headers(&captures["request_headers_part"]),
                body: captures["request_body_part"].into(),
            },
            response_data: ResponseData {
                status_code,
                headers: parse_headers(&captures["response_headers_part"]),
                body: captures["response_body_part"].into(),
            },
        });
    }

    if data.is_empty() {
        Err(Error::InvalidMarkdownFormat)
    } else {
        Ok(data)
    }
}

fn parse_headers<T: AsRef<str>>(headers_part: T) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    for capture in HEADER_REGEX.captures_iter(headers_part.as_ref()) {
        headers.insert(
            capture["header_key"].trim().to_lowercase(),
            String::from(capture["header_value"].trim()),
        );
    }

    headers
}

pub fn save_interactions<'a, P: AsRef<Path>, I: IntoIterator<Item = &'a InteractionData>>(
    markdown_path: P,
    interactions: I,
) -> Result<(), Error> {
    if let Some(parent) = markdown_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = BufWriter::new(File::create(markdown_path.as_ref())?);
    write_interactions(&mut file, interactions)?;
    file.flush()?;

    Ok(())
}

pub fn write_interactions<'a, W: Write, I: IntoIterator<Item = &'a InteractionData>>(
    out: &mut W,
    interactions: I,
) -> Result<(), Error> {
    for (number, interaction) in interactions.into_iter().enumerate() {
        let request = &interaction.request_data;
        let response = &interaction.response_data;

        write!(out, "## Interaction {}: {} {}\n\n", number, request.method, request.uri)?;

        write!(out, "### Request headers recorded for playback:\n\n```\n")?;
        for (key, value) in &request.headers {
            writeln!(out, "{}: {}", key, value)?;
        }
        write!(out, "```\n\n")?;

        write!(
            out,
            "### Request body recorded for playback ({}):\n\n```\n{}\n```\n\n",
            request.headers.get("content-type").map(String::as_str).unwrap_or(""),
            request.body,
        )?;

        write!(out, "### Response headers recorded for playback:\n\n```\n")?;
        for (key, value) in &response.headers {
            writeln!(out, "{}: {}", key, value)?;
        }
        write!(out, "```\n\n")?;

        write!(
            out,
            "### Response body recorded for playback ({}: {}):\n\n```\n{}\n```\n\n",
            response.status_code,
            response.content_type(),
            response.body
        )?;
    }

    Ok(())
}
