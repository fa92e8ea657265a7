use super::fields::{optional_text, positive_id, required_text, Fields};
use super::Record;
use crate::codec::{FlatMap, ObjectWriter, ToFlatJson};
use crate::error::ValidationError;
use crate::store::CustomerRow;
use crate::validation::{digits_only, format_national_id, format_phone, validate_email, validate_national_id, validate_phone};
use chrono::NaiveDateTime;

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: Option<i32>,
    name: String,
    national_id: String,
    phone: Option<String>,
    email: String,
    address: Option<String>,
    registered_at: Option<NaiveDateTime>,
}

impl Customer {
    pub fn new(name: &str, national_id: &str, email: &str) -> Result<Self, ValidationError> {
        let mut customer = Self {
            id: None,
            name: String::new(),
            national_id: String::new(),
            phone: None,
            email: String::new(),
            address: None,
            registered_at: None,
        };
        customer.set_name(name)?;
        customer.set_national_id(national_id)?;
        customer.set_email(email)?;
        Ok(customer)
    }

    /// Build from decoded request fields, validating every field.
    pub fn parse_validated(fields: &FlatMap) -> Result<Self, ValidationError> {
        let mut customer = Self::new(
            fields.text("nome").unwrap_or_default(),
            fields.text("cpf").unwrap_or_default(),
            fields.text("email").unwrap_or_default(),
        )?;
        customer.set_id(fields.parsed("idCliente"))?;
        customer.set_phone(fields.text("telefone"))?;
        customer.set_address(fields.text("endereco"))?;
        Ok(customer)
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i32>) -> Result<(), ValidationError> {
        self.id = positive_id("idCliente", id)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("nome", name, NAME_MAX)?;
        Ok(())
    }

    /// Digits only.
    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn formatted_national_id(&self) -> Option<String> {
        format_national_id(&self.national_id)
    }

    pub fn set_national_id(&mut self, raw: &str) -> Result<(), ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::new("cpf", "must not be blank"));
        }
        let digits = digits_only(raw);
        if digits.len() != 11 {
            return Err(ValidationError::new("cpf", "must contain 11 digits"));
        }
        if !validate_national_id(&digits) {
            return Err(ValidationError::new("cpf", "invalid check digits"));
        }
        self.national_id = digits;
        Ok(())
    }

    /// Digits only.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn formatted_phone(&self) -> Option<String> {
        self.phone.as_deref().and_then(format_phone)
    }

    /// Blank or absent clears the phone.
    pub fn set_phone(&mut self, raw: Option<&str>) -> Result<(), ValidationError> {
        self.phone = match raw {
            Some(p) if !p.trim().is_empty() => {
                if !validate_phone(p) {
                    return Err(ValidationError::new("telefone", "must contain 10 or 11 digits"));
                }
                Some(digits_only(p))
            }
            _ => None,
        };
        Ok(())
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Stored trimmed and lower-cased.
    pub fn set_email(&mut self, raw: &str) -> Result<(), ValidationError> {
        let email = required_text("email", raw, EMAIL_MAX)?;
        if !validate_email(&email) {
            return Err(ValidationError::new("email", "must be a valid address"));
        }
        self.email = email.to_lowercase();
        Ok(())
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn set_address(&mut self, raw: Option<&str>) -> Result<(), ValidationError> {
        self.address = optional_text("endereco", raw, ADDRESS_MAX)?;
        Ok(())
    }

    pub fn registered_at(&self) -> Option<NaiveDateTime> {
        self.registered_at
    }
}

impl Record for Customer {
    type Row = CustomerRow;
    const ENTITY: &'static str = "Customer";

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn to_row(&self) -> CustomerRow {
        CustomerRow {
            id_cliente: self.id.unwrap_or_default(),
            nome: Some(self.name.clone()),
            cpf: Some(self.national_id.clone()),
            telefone: self.phone.clone(),
            email: Some(self.email.clone()),
            endereco: self.address.clone(),
            data_cadastro: self.registered_at,
        }
    }

    fn revive_from_storage(row: CustomerRow) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            id: Some(row.id_cliente),
            name: row.nome.map(|n| n.trim().to_string()).unwrap_or_default(),
            national_id: row.cpf.unwrap_or_default(),
            phone: clean(row.telefone),
            email: clean(row.email).map(|e| e.to_lowercase()).unwrap_or_default(),
            address: clean(row.endereco),
            registered_at: row.data_cadastro,
        }
    }
}

impl ToFlatJson for Customer {
    fn to_flat_json(&self) -> String {
        ObjectWriter::new()
            .opt_int("idCliente", self.id.map(i64::from))
            .string("nome", &self.name)
            .string("cpf", &self.national_id)
            .opt_string("telefone", self.phone())
            .string("email", &self.email)
            .opt_string("endereco", self.address())
            .opt_datetime("dataCadastro", self.registered_at)
            .finish()
    }
}
