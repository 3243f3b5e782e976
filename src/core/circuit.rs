use serde::Serialize;

use crate::core::csv::parse_line;

/// Minimum field count of a data row: Sivu, Katu, Osoite, Nimi, Merkinnät.
const MIN_FIELDS: usize = 5;

const STREET_FIELD: usize = 1;
const ADDRESS_FIELD: usize = 2;
const NAME_FIELD: usize = 3;
const PRODUCT_FIELD: usize = 4;

/// One delivery stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    /// Raw product field, possibly several codes ("HS2, UV").
    pub product: String,
    pub street: String,
    /// Street number and the rest of the address after the street name.
    pub number: String,
    /// The address field as written in the file.
    pub full_address: String,
    pub name: String,
}

impl Subscriber {
    /// "<street> <number>", or whichever part is present.
    pub fn address(&self) -> String {
        match (self.street.is_empty(), self.number.is_empty()) {
            (false, false) => format!("{} {}", self.street, self.number),
            (false, true) => self.street.clone(),
            _ => self.number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Circuit {
    pub code: String,
    pub display_name: Option<String>,
    pub subscribers: Vec<Subscriber>,
}

impl Circuit {
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.code)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Build subscriber records from the full text of a circuit file.
///
/// The first line is a header. Blank lines and rows with fewer than five
/// fields are dropped without error. Row order is preserved.
pub fn parse_circuit_data(text: &str) -> Vec<Subscriber> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = parse_line(line);
            if fields.len() < MIN_FIELDS {
                return None;
            }
            let street = fields[STREET_FIELD].clone();
            let full_address = fields[ADDRESS_FIELD].clone();
            let number = bare_number(&street, &full_address);
            Some(Subscriber {
                product: fields[PRODUCT_FIELD].clone(),
                street,
                number,
                full_address,
                name: fields[NAME_FIELD].clone(),
            })
        })
        .collect()
}

/// Strip a leading "<street> " from the full address.
///
/// Addresses that do not start with the street name are passed through.
pub fn bare_number(street: &str, address: &str) -> String {
    if street.is_empty() {
        return address.to_string();
    }
    address
        .strip_prefix(street)
        .and_then(|rest| rest.strip_prefix(' '))
        .unwrap_or(address)
        .to_string()
}
