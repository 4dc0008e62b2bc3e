use crate::sdp::sdp_error::SdpError;
use std::{fmt, str::FromStr};

/// Representa un atributo `a=` en SDP.
///
/// Un atributo consiste en una clave y un valor opcional.
/// Ejemplos comunes: `"rtpmap"`, `"fmtp"`, `"rtcp-mux"`.
#[derive(Debug, Clone)]
pub struct Attribute {
    key: String,
    value: Option<String>,
}

impl Attribute {
    /// Constructor completo.
    ///
    /// # Parámetros
    /// - `key`: clave del atributo, por ejemplo `"rtpmap"`.
    /// - `value`: valor opcional asociado al atributo.
    pub fn new<K: Into<String>, V: Into<Option<String>>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Constructor por defecto.
    ///
    /// Valores por defecto:
    /// - `key` = `""`
    /// - `value` = `None`
    pub fn new_blank() -> Self {
        Self {
            key: "".to_string(),
            value: None,
        }
    }

    // --- GETTERS ---
    /// Retorna una referencia a la clave del atributo.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Retorna una referencia al valor opcional del atributo.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    // --- SETTERS ---
    /// Establece la clave del atributo.
    pub fn set_key<K: Into<String>>(&mut self, key: K) {
        self.key = key.into();
    }

    /// Establece el valor opcional del atributo.
    pub fn set_value<V: Into<Option<String>>>(&mut self, value: V) {
        self.value = value.into();
    }
}

// a=<attribute>[:<value>] — value is everything after the first ':', flag attributes have none.
impl FromStr for Attribute {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SdpError::Invalid("a="));
        }
        match s.split_once(':') {
            Some((key, value)) => Ok(Self::new(key.to_owned(), Some(value.to_owned()))),
            None => Ok(Self::new(s.to_owned(), None)),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}:{}", self.key(), v),
            None => f.write_str(self.key()),
        }
    }
}
