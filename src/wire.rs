// Minimal DNS wire-format support for query log payloads.
//
// Legacy lines carry the original query as a base64-encoded packed DNS
// message. Only the pieces the query log reads back are implemented here:
// the fixed header and the question section.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("overflow unpacking {0}")]
    Overflow(&'static str),
    #[error("bad label length {0}")]
    BadLabelLength(usize),
    #[error("compressed name in question section")]
    CompressedName,
    #[error("domain name exceeds 255 octets")]
    NameTooLong,
}

/// One entry of a message's question section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Fully qualified name, trailing dot included.
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// The slice of a DNS message the query log cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: u16,
    pub flags: u16,
    pub questions: Vec<Question>,
}

impl Message {
    /// Packs the header and question section into wire format. The answer,
    /// authority and additional counts are written as zero.
    pub fn pack(&self) -> Result<Vec<u8>, WireError> {
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&(self.questions.len() as u16).to_be_bytes());
        out.extend_from_slice(&[0; 6]);

        for q in &self.questions {
            pack_name(&mut out, &q.name)?;
            out.extend_from_slice(&q.qtype.to_be_bytes());
            out.extend_from_slice(&q.qclass.to_be_bytes());
        }
        Ok(out)
    }
}

/// Unpacks the header and question section of a packed DNS message.
pub fn unpack(buf: &[u8]) -> Result<Message, WireError> {
    let mut cur = Cursor { buf, off: 0 };

    let id = cur.read_u16("id")?;
    let flags = cur.read_u16("flags")?;
    let qdcount = cur.read_u16("qdcount")?;
    // Section counts beyond the questions are parsed for framing only.
    let _ancount = cur.read_u16("ancount")?;
    let _nscount = cur.read_u16("nscount")?;
    let _arcount = cur.read_u16("arcount")?;

    let mut questions = Vec::with_capacity(qdcount as usize);
    for _ in 0..qdcount {
        let name = cur.read_name()?;
        let qtype = cur.read_u16("qtype")?;
        let qclass = cur.read_u16("qclass")?;
        questions.push(Question { name, qtype, qclass });
    }

    Ok(Message { id, flags, questions })
}

/// Mnemonic form of a record type, RFC 3597 style for unknown codes.
pub fn type_to_string(qtype: u16) -> String {
    let known = match qtype {
        1 => "A",
        2 => "NS",
        5 => "CNAME",
        6 => "SOA",
        12 => "PTR",
        15 => "MX",
        16 => "TXT",
        28 => "AAAA",
        33 => "SRV",
        43 => "DS",
        46 => "RRSIG",
        48 => "DNSKEY",
        65 => "HTTPS",
        255 => "ANY",
        _ => return format!("TYPE{qtype}"),
    };
    known.to_string()
}

/// Mnemonic form of a class, RFC 3597 style for unknown codes.
pub fn class_to_string(qclass: u16) -> String {
    let known = match qclass {
        1 => "IN",
        3 => "CH",
        4 => "HS",
        254 => "NONE",
        255 => "ANY",
        _ => return format!("CLASS{qclass}"),
    };
    known.to_string()
}

struct Cursor<'a> {
    buf: &'a [u8],
    off: usize,
}

impl Cursor<'_> {
    fn read_u16(&mut self, what: &'static str) -> Result<u16, WireError> {
        let end = self.off + 2;
        if end > self.buf.len() {
            return Err(WireError::Overflow(what));
        }
        let v = u16::from_be_bytes([self.buf[self.off], self.buf[self.off + 1]]);
        self.off = end;
        Ok(v)
    }

    fn read_name(&mut self) -> Result<String, WireError> {
        let mut name = String::new();
        loop {
            let Some(&len) = self.buf.get(self.off) else {
                return Err(WireError::Overflow("label"));
            };
            self.off += 1;

            if len == 0 {
                break;
            }
            // The two high bits mark a compression pointer; question
            // sections of packed queries never contain one.
            if len & 0xc0 != 0 {
                return Err(WireError::CompressedName);
            }
            let end = self.off + len as usize;
            if end > self.buf.len() {
                return Err(WireError::Overflow("label"));
            }
            name.push_str(&String::from_utf8_lossy(&self.buf[self.off..end]));
            name.push('.');
            self.off = end;

            if name.len() > 255 {
                return Err(WireError::NameTooLong);
            }
        }
        if name.is_empty() {
            name.push('.');
        }
        Ok(name)
    }
}

fn pack_name(out: &mut Vec<u8>, name: &str) -> Result<(), WireError> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.len() > 254 {
        return Err(WireError::NameTooLong);
    }
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() || label.len() > 63 {
                return Err(WireError::BadLabelLength(label.len()));
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_single_question() {
        let msg = Message {
            id: 42,
            flags: 0x0100,
            questions: vec![Question {
                name: "google.com.".to_string(),
                qtype: 15,
                qclass: 1,
            }],
        };

        let buf = msg.pack().unwrap();
        assert_eq!(&buf[..4], &[0, 42, 0x01, 0x00][..]);
        assert_eq!(&buf[4..6], &[0, 1][..]);

        let parsed = unpack(&buf).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_unpack_root_name() {
        let msg = Message {
            id: 1,
            flags: 0,
            questions: vec![Question {
                name: ".".to_string(),
                qtype: 2,
                qclass: 1,
            }],
        };
        let parsed = unpack(&msg.pack().unwrap()).unwrap();
        assert_eq!(parsed.questions[0].name, ".");
    }

    #[test]
    fn test_unpack_truncated_header() {
        assert_eq!(unpack(&[]), Err(WireError::Overflow("id")));
        assert_eq!(unpack(&[0, 1, 2]), Err(WireError::Overflow("flags")));
    }

    #[test]
    fn test_unpack_truncated_question() {
        let mut buf = Message {
            id: 7,
            flags: 0,
            questions: vec![Question {
                name: "example.org.".to_string(),
                qtype: 1,
                qclass: 1,
            }],
        }
        .pack()
        .unwrap();
        buf.truncate(buf.len() - 3);
        assert_eq!(unpack(&buf), Err(WireError::Overflow("qtype")));
    }

    #[test]
    fn test_unpack_rejects_compression_pointer() {
        // Header with one question whose name starts with a pointer byte.
        let buf = [0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0xc0, 0x0c, 0, 1, 0, 1];
        assert_eq!(unpack(&buf), Err(WireError::CompressedName));
    }

    #[test]
    fn test_pack_rejects_long_label() {
        let msg = Message {
            id: 0,
            flags: 0,
            questions: vec![Question {
                name: format!("{}.com.", "a".repeat(64)),
                qtype: 1,
                qclass: 1,
            }],
        };
        assert_eq!(msg.pack(), Err(WireError::BadLabelLength(64)));
    }

    #[test]
    fn test_rr_strings() {
        assert_eq!(type_to_string(15), "MX");
        assert_eq!(type_to_string(999), "TYPE999");
        assert_eq!(class_to_string(1), "IN");
        assert_eq!(class_to_string(9), "CLASS9");
    }
}
