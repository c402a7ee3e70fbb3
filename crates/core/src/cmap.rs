use std::collections::BTreeMap;

const MAX_RANGE_SPAN: u32 = 0xFFFF;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    entries: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
}

impl ToUnicodeMap {
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut entries = BTreeMap::new();
        let mut index = 0;

        while index < tokens.len() {
            match &tokens[index] {
                Token::Word(word) if word == "beginbfchar" => {
                    index += 1;
                    while index + 1 < tokens.len() {
                        match (&tokens[index], &tokens[index + 1]) {
                            (Token::Hex(source), Token::Hex(target)) => {
                                entries.insert(code_of(source), utf16_text(target));
                                index += 2;
                            }
                            _ => break,
                        }
                    }
                }
                Token::Word(word) if word == "beginbfrange" => {
                    index += 1;
                    while index + 2 < tokens.len() {
                        let (low, high) = match (&tokens[index], &tokens[index + 1]) {
                            (Token::Hex(low), Token::Hex(high)) => (code_of(low), code_of(high)),
                            _ => break,
                        };
                        if high < low || high - low > MAX_RANGE_SPAN {
                            break;
                        }

                        match &tokens[index + 2] {
                            Token::Hex(target) => {
                                for offset in 0..=(high - low) {
                                    entries.insert(low + offset, offset_text(target, offset));
                                }
                                index += 3;
                            }
                            Token::ArrayStart => {
                                index += 3;
                                let mut code = low;
                                while let Some(Token::Hex(target)) = tokens.get(index) {
                                    if code <= high {
                                        entries.insert(code, utf16_text(target));
                                    }
                                    code = code.saturating_add(1);
                                    index += 1;
                                }
                                if tokens.get(index) == Some(&Token::ArrayEnd) {
                                    index += 1;
                                }
                            }
                            _ => break,
                        }
                    }
                }
                _ => index += 1,
            }
        }

        Self { entries }
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < data.len() {
        let byte = data[index];
        match byte {
            b'%' => {
                while index < data.len() && data[index] != b'\n' && data[index] != b'\r' {
                    index += 1;
                }
            }
            b'<' if data.get(index + 1) == Some(&b'<') => {
                tokens.push(Token::Word("<<".to_string()));
                index += 2;
            }
            b'>' if data.get(index + 1) == Some(&b'>') => {
                tokens.push(Token::Word(">>".to_string()));
                index += 2;
            }
            b'<' => {
                let start = index + 1;
                let mut end = start;
                while end < data.len() && data[end] != b'>' {
                    end += 1;
                }
                tokens.push(Token::Hex(decode_hex(&data[start..end])));
                index = end + 1;
            }
            b'(' => {
                let mut depth = 0usize;
                while index < data.len() {
                    match data[index] {
                        b'\\' => index += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    index += 1;
                }
                index += 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                index += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                index += 1;
            }
            _ if byte.is_ascii_whitespace() => index += 1,
            _ => {
                let start = index;
                while index < data.len()
                    && !data[index].is_ascii_whitespace()
                    && !matches!(data[index], b'<' | b'>' | b'[' | b']' | b'(' | b'%')
                {
                    index += 1;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..index]).into_owned(),
                ));
            }
        }
    }

    tokens
}

fn decode_hex(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|digit| (*digit as char).to_digit(16).map(|value| value as u8))
        .collect();

    nibbles
        .chunks(2)
        .map(|pair| match pair {
            [high, low] => (high << 4) | low,
            [high] => high << 4,
            _ => 0,
        })
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |code, byte| (code << 8) | u32::from(*byte))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [high, low] => u16::from_be_bytes([*high, *low]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn utf16_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn offset_text(bytes: &[u8], offset: u32) -> String {
    let mut units = utf16_units(bytes);
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(offset as u16);
    }
    String::from_utf16_lossy(&units)
}
