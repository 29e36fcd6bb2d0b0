/// Placeholder shown when no address is known
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Human-readable address produced by the geocoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResult {
    pub text: String,
    pub postal_code: Option<String>,
}

impl AddressResult {
    /// Build an address, treating a blank postal code as absent
    pub fn new(text: impl Into<String>, postal_code: Option<String>) -> Self {
        Self {
            text: text.into(),
            postal_code: postal_code.filter(|code| !code.trim().is_empty()),
        }
    }

    /// Text for the address box, with the postal code appended on request
    pub fn display(&self, include_postal_code: bool) -> String {
        match (&self.postal_code, include_postal_code) {
            (Some(code), true) => format!("{}, {}", self.text, code),
            _ => self.text.clone(),
        }
    }
}

/// Renders an optional address the way the address box shows it
pub fn display_address(address: Option<&AddressResult>, include_postal_code: bool) -> String {
    match address {
        Some(address) if !address.text.is_empty() => address.display(include_postal_code),
        _ => ADDRESS_NOT_FOUND.to_string(),
    }
}
