//! Decoding of the serialized `elements_chain` column.
//!
//! A chain is a `;`-separated list of elements such as
//! `a.btn.primary:href="/signup"nth-child="2"attr__data-id="x"`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::collaborators::ElementChainDecoder;
use super::models::Element;

static SPLIT_CHAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:[^\s;"]|"(?:\\.|[^"])*")+"#).unwrap());
static SPLIT_CLASS_ATTRIBUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?)($|:([a-zA-Z\-_0-9]*=.*))").unwrap());
static PARSE_ATTRIBUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"((.*?)="(.*?[^\\])")"#).unwrap());

pub fn chain_to_elements(chain: &str) -> Vec<Element> {
    SPLIT_CHAIN
        .find_iter(chain)
        .enumerate()
        .map(|(order, el_string)| parse_element(el_string.as_str(), order as i64))
        .collect()
}

fn parse_element(el_string: &str, order: i64) -> Element {
    let mut element = Element {
        order: Some(order),
        ..Default::default()
    };
    let Some(caps) = SPLIT_CLASS_ATTRIBUTES.captures(el_string) else {
        return element;
    };

    let tag_and_class = caps.get(1).map_or("", |m| m.as_str());
    if !tag_and_class.is_empty() {
        let mut parts = tag_and_class.split('.');
        element.tag_name = parts.next().map(str::to_string);
        let classes: Vec<String> = parts
            .filter(|class| !class.is_empty())
            .map(str::to_string)
            .collect();
        if !classes.is_empty() {
            element.attr_class = Some(classes);
        }
    }

    let attributes = caps.get(3).map_or("", |m| m.as_str());
    for attribute in PARSE_ATTRIBUTES.captures_iter(attributes) {
        let key = attribute.get(2).map_or("", |m| m.as_str());
        let value = attribute.get(3).map_or("", |m| m.as_str());
        match key {
            "href" => element.href = Some(value.to_string()),
            "nth-child" => element.nth_child = value.parse().ok(),
            "nth-of-type" => element.nth_of_type = value.parse().ok(),
            "text" => element.text = Some(value.to_string()),
            "attr_id" => element.attr_id = Some(value.to_string()),
            "" => {}
            _ => {
                element
                    .attributes
                    .insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    element
}

/// Decodes chains with [`chain_to_elements`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultElementChainDecoder;

impl ElementChainDecoder for DefaultElementChainDecoder {
    fn decode_chain(&self, elements_chain: &str) -> Vec<Element> {
        chain_to_elements(elements_chain)
    }
}
