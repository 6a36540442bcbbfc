//! Outbound WhatsApp deep links. Pure string formatting.

use crate::{config::Config, map::entities::EntityRef};

pub const MESSAGE_PREFIX: &str = "inmoovi:start";
const WHATSAPP_BASE: &str = "https://wa.me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
  number: String,
  source: String,
}

impl LinkBuilder {
  #[must_use]
  pub fn new(number: &str, source: &str) -> Self {
    Self {
      number: number.to_string(),
      source: source.to_string(),
    }
  }

  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    Self::new(config.whatsapp_number(), config.link_source())
  }

  /// The link for the page's generic call-to-action buttons.
  #[must_use]
  pub fn landing_link(&self) -> String {
    self.link(&self.message(&[]))
  }

  /// A link carrying an entity id plus extra `key=value` flags.
  #[must_use]
  pub fn entity_link(&self, entity: &EntityRef, flags: &[(&str, &str)]) -> String {
    let entity = entity.to_string();
    let mut pairs = vec![entity.as_str()];
    let flags: Vec<String> = flags.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.extend(flags.iter().map(String::as_str));
    self.link(&self.message(&pairs))
  }

  fn message(&self, pairs: &[&str]) -> String {
    let mut message = format!("{MESSAGE_PREFIX} source={}", self.source);
    for pair in pairs {
      message.push(' ');
      message.push_str(pair);
    }
    message
  }

  fn link(&self, text: &str) -> String {
    format!(
      "{WHATSAPP_BASE}/{}?text={}",
      self.number,
      urlencoding::encode(text)
    )
  }
}
