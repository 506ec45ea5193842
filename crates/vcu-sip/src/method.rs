use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The dialect's recognized methods (spec.md §3 "Message params").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Info,
    Register,
    Invite,
    Ack,
    Bye,
    Refer,
    Message,
    Notify,
    Subscribe,
    Cancel,
    Options,
}

impl Method {
    /// The upper-case wire token, e.g. `"INVITE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Info => "INFO",
            Method::Register => "REGISTER",
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Refer => "REFER",
            Method::Message => "MESSAGE",
            Method::Notify => "NOTIFY",
            Method::Subscribe => "SUBSCRIBE",
            Method::Cancel => "CANCEL",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Method::Info),
            "REGISTER" => Ok(Method::Register),
            "INVITE" => Ok(Method::Invite),
            "ACK" => Ok(Method::Ack),
            "BYE" => Ok(Method::Bye),
            "REFER" => Ok(Method::Refer),
            "MESSAGE" => Ok(Method::Message),
            "NOTIFY" => Ok(Method::Notify),
            "SUBSCRIBE" => Ok(Method::Subscribe),
            "CANCEL" => Ok(Method::Cancel),
            "OPTIONS" => Ok(Method::Options),
            other => Err(Error::InvalidMethod(other.to_string())),
        }
    }
}

/// Whether a [`MessageParams`](crate::params::MessageParams) is a request or a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    Request,
    Response,
}
