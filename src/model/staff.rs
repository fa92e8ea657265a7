use super::fields::{not_future, positive_id, required_text, today, Fields};
use super::Record;
use crate::codec::{FlatMap, ObjectWriter, ToFlatJson};
use crate::error::ValidationError;
use crate::store::StaffRow;
use crate::validation::{digits_only, validate_email, validate_phone};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;

const VETERINARIAN_MULTIPLIER: f64 = 1.5;
const GROOMER_MULTIPLIER: f64 = 1.2;
const RECEPTIONIST_MULTIPLIER: f64 = 1.0;

/// Staff role; its tag is the stored `cargo` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Veterinarian,
    Groomer,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Veterinarian, Role::Groomer, Role::Receptionist];

    pub fn tag(self) -> &'static str {
        match self {
            Role::Veterinarian => "VETERINARIO",
            Role::Groomer => "TOSADOR",
            Role::Receptionist => "ATENDENTE",
        }
    }

    /// Case-insensitive, surrounding whitespace ignored.
    pub fn from_tag(tag: &str) -> Option<Role> {
        let tag = tag.trim();
        Role::ALL.into_iter().find(|r| r.tag().eq_ignore_ascii_case(tag))
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Veterinarian => "Veterinarian: clinical care and surgery",
            Role::Groomer => "Groomer: grooming and aesthetic care",
            Role::Receptionist => "Receptionist: front desk, sales and scheduling",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fields shared by every role.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffProfile {
    id: Option<i32>,
    name: String,
    national_id: String,
    phone: Option<String>,
    email: String,
    base_pay: Option<f64>,
    hire_date: Option<NaiveDate>,
    active: bool,
    registered_at: Option<NaiveDateTime>,
}

impl StaffProfile {
    pub fn new(name: &str, national_id: &str, email: &str) -> Result<Self, ValidationError> {
        let mut profile = Self {
            id: None,
            name: String::new(),
            national_id: String::new(),
            phone: None,
            email: String::new(),
            base_pay: None,
            hire_date: None,
            active: true,
            registered_at: None,
        };
        profile.set_name(name)?;
        profile.set_national_id(national_id)?;
        profile.set_email(email)?;
        Ok(profile)
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i32>) -> Result<(), ValidationError> {
        self.id = positive_id("idFuncionario", id)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("nome", name, NAME_MAX)?;
        Ok(())
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    /// Eleven digits; check digits are not enforced for staff.
    pub fn set_national_id(&mut self, raw: &str) -> Result<(), ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::new("cpf", "must not be blank"));
        }
        let digits = digits_only(raw);
        if digits.len() != 11 {
            return Err(ValidationError::new("cpf", "must contain 11 digits"));
        }
        self.national_id = digits;
        Ok(())
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

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

    pub fn set_email(&mut self, raw: &str) -> Result<(), ValidationError> {
        let email = required_text("email", raw, EMAIL_MAX)?;
        if !validate_email(&email) {
            return Err(ValidationError::new("email", "must be a valid address"));
        }
        self.email = email.to_lowercase();
        Ok(())
    }

    pub fn base_pay(&self) -> Option<f64> {
        self.base_pay
    }

    pub fn set_base_pay(&mut self, base_pay: Option<f64>) -> Result<(), ValidationError> {
        if let Some(pay) = base_pay {
            if !(pay >= 0.0 && pay.is_finite()) {
                return Err(ValidationError::new("salarioBase", "must not be negative"));
            }
        }
        self.base_pay = base_pay;
        Ok(())
    }

    pub fn hire_date(&self) -> Option<NaiveDate> {
        self.hire_date
    }

    pub fn set_hire_date(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.hire_date = not_future("dataContratacao", date)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `None` means active.
    pub fn set_active(&mut self, active: Option<bool>) {
        self.active = active.unwrap_or(true);
    }

    pub fn registered_at(&self) -> Option<NaiveDateTime> {
        self.registered_at
    }
}

/// A staff member. The variant is the role: compensation and the stored
/// discriminator are both derived from it.
#[derive(Debug, Clone, PartialEq)]
pub enum Staff {
    Veterinarian(StaffProfile),
    Groomer(StaffProfile),
    Receptionist(StaffProfile),
}

impl Staff {
    pub fn new(role: Role, profile: StaffProfile) -> Self {
        match role {
            Role::Veterinarian => Staff::Veterinarian(profile),
            Role::Groomer => Staff::Groomer(profile),
            Role::Receptionist => Staff::Receptionist(profile),
        }
    }

    /// Build from decoded request fields. A missing `cargo` means
    /// receptionist; an unrecognised one is rejected.
    pub fn parse_validated(fields: &FlatMap) -> Result<Self, ValidationError> {
        let role = match fields.text("cargo") {
            None => Role::Receptionist,
            Some(tag) if tag.trim().is_empty() => Role::Receptionist,
            Some(tag) => Role::from_tag(tag).ok_or_else(|| {
                ValidationError::new("cargo", format!("unknown role '{}'", tag.trim()))
            })?,
        };
        let mut profile = StaffProfile::new(
            fields.text("nome").unwrap_or_default(),
            fields.text("cpf").unwrap_or_default(),
            fields.text("email").unwrap_or_default(),
        )?;
        profile.set_id(fields.parsed("idFuncionario"))?;
        profile.set_phone(fields.text("telefone"))?;
        profile.set_base_pay(fields.parsed("salarioBase"))?;
        profile.set_hire_date(fields.date("dataContratacao"))?;
        profile.set_active(fields.flag("ativo"));
        Ok(Staff::new(role, profile))
    }

    pub fn role(&self) -> Role {
        match self {
            Staff::Veterinarian(_) => Role::Veterinarian,
            Staff::Groomer(_) => Role::Groomer,
            Staff::Receptionist(_) => Role::Receptionist,
        }
    }

    pub fn profile(&self) -> &StaffProfile {
        match self {
            Staff::Veterinarian(p) | Staff::Groomer(p) | Staff::Receptionist(p) => p,
        }
    }

    pub fn profile_mut(&mut self) -> &mut StaffProfile {
        match self {
            Staff::Veterinarian(p) | Staff::Groomer(p) | Staff::Receptionist(p) => p,
        }
    }

    pub fn into_profile(self) -> StaffProfile {
        match self {
            Staff::Veterinarian(p) | Staff::Groomer(p) | Staff::Receptionist(p) => p,
        }
    }

    /// Base pay times the role multiplier; no base pay earns 0.
    pub fn calculate_compensation(&self) -> f64 {
        let (profile, multiplier) = match self {
            Staff::Veterinarian(p) => (p, VETERINARIAN_MULTIPLIER),
            Staff::Groomer(p) => (p, GROOMER_MULTIPLIER),
            Staff::Receptionist(p) => (p, RECEPTIONIST_MULTIPLIER),
        };
        profile.base_pay.map_or(0.0, |base| base * multiplier)
    }

    pub fn role_description(&self) -> &'static str {
        self.role().description()
    }

    /// Whole years since hire; `None` without a hire date.
    pub fn tenure(&self) -> Option<u32> {
        self.tenure_on(today())
    }

    pub fn tenure_on(&self, today: NaiveDate) -> Option<u32> {
        self.profile()
            .hire_date
            .map(|hired| today.years_since(hired).unwrap_or(0))
    }
}

impl Record for Staff {
    type Row = StaffRow;
    const ENTITY: &'static str = "Staff member";

    fn id(&self) -> Option<i32> {
        self.profile().id
    }

    fn to_row(&self) -> StaffRow {
        let p = self.profile();
        StaffRow {
            id_funcionario: p.id.unwrap_or_default(),
            nome: Some(p.name.clone()),
            cpf: Some(p.national_id.clone()),
            telefone: p.phone.clone(),
            email: Some(p.email.clone()),
            cargo: Some(self.role().tag().to_string()),
            salario_base: p.base_pay,
            data_contratacao: p.hire_date,
            ativo: Some(p.active),
            data_cadastro: p.registered_at,
        }
    }

    fn revive_from_storage(row: StaffRow) -> Self {
        let role = match row.cargo.as_deref().and_then(Role::from_tag) {
            Some(role) => role,
            None => {
                tracing::warn!(
                    id = row.id_funcionario,
                    cargo = ?row.cargo,
                    "unknown stored role, loading as receptionist"
                );
                Role::Receptionist
            }
        };
        let profile = StaffProfile {
            id: Some(row.id_funcionario),
            name: row.nome.unwrap_or_default(),
            national_id: row.cpf.unwrap_or_default(),
            phone: row.telefone,
            email: row.email.unwrap_or_default(),
            base_pay: row.salario_base,
            hire_date: row.data_contratacao,
            active: row.ativo.unwrap_or(true),
            registered_at: row.data_cadastro,
        };
        Staff::new(role, profile)
    }
}

impl ToFlatJson for Staff {
    fn to_flat_json(&self) -> String {
        let p = self.profile();
        ObjectWriter::new()
            .opt_int("idFuncionario", p.id.map(i64::from))
            .string("nome", &p.name)
            .string("cpf", &p.national_id)
            .opt_string("telefone", p.phone())
            .string("email", &p.email)
            .string("cargo", self.role().tag())
            .opt_float("salarioBase", p.base_pay)
            .float("salarioCalculado", self.calculate_compensation())
            .opt_date("dataContratacao", p.hire_date)
            .boolean("ativo", p.active)
            .opt_datetime("dataCadastro", p.registered_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn profile(base_pay: Option<f64>) -> StaffProfile {
        let mut p = StaffProfile::new("Carla Dias", "123.456.789-00", "carla@petshop.com").unwrap();
        p.set_base_pay(base_pay).unwrap();
        p
    }

    #[test]
    fn test_compensation_dispatch() {
        let expected = [
            (Role::Veterinarian, 1500.0),
            (Role::Groomer, 1200.0),
            (Role::Receptionist, 1000.0),
        ];
        for (role, pay) in expected {
            let staff = Staff::new(role, profile(Some(1000.0)));
            assert!((staff.calculate_compensation() - pay).abs() < 1e-9, "{role}");
            assert_eq!(Staff::new(role, profile(None)).calculate_compensation(), 0.0);
        }
    }

    #[test]
    fn test_role_tags() {
        assert_eq!(Role::from_tag("veterinario"), Some(Role::Veterinarian));
        assert_eq!(Role::from_tag(" TOSADOR "), Some(Role::Groomer));
        assert_eq!(Role::from_tag("Atendente"), Some(Role::Receptionist));
        assert_eq!(Role::from_tag("GERENTE"), None);
        for role in Role::ALL {
            assert_eq!(Role::from_tag(role.tag()), Some(role));
        }
    }

    #[test]
    fn test_parse_validated_role_selection() {
        let base = r#""nome":"Carla","cpf":"12345678900","email":"c@p.com""#;
        let vet = Staff::parse_validated(&decode(&format!(r#"{{{base},"cargo":"veterinario","salarioBase":"2000"}}"#)).unwrap())
            .unwrap();
        assert_eq!(vet.role(), Role::Veterinarian);
        assert_eq!(vet.calculate_compensation(), 3000.0);

        let default = Staff::parse_validated(&decode(&format!("{{{base}}}")).unwrap()).unwrap();
        assert_eq!(default.role(), Role::Receptionist);
        assert!(default.profile().is_active());

        let err = Staff::parse_validated(&decode(&format!(r#"{{{base},"cargo":"GERENTE"}}"#)).unwrap()).unwrap_err();
        assert_eq!(err.field, "cargo");
    }

    #[test]
    fn test_national_id_has_no_check_digit() {
        let mut p = profile(None);
        p.set_national_id("11111111111").unwrap();
        assert!(p.set_national_id("1234").is_err());
        assert!(p.set_national_id(" ").is_err());
    }

    #[test]
    fn test_base_pay_and_hire_date_checks() {
        let mut p = profile(None);
        assert!(p.set_base_pay(Some(-1.0)).is_err());
        p.set_base_pay(Some(0.0)).unwrap();
        let tomorrow = today().succ_opt().unwrap();
        assert!(p.set_hire_date(Some(tomorrow)).is_err());
    }

    #[test]
    fn test_tenure() {
        let mut p = profile(None);
        p.set_hire_date(NaiveDate::from_ymd_opt(2018, 6, 1)).unwrap();
        let staff = Staff::new(Role::Groomer, p);
        assert_eq!(staff.tenure_on(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()), Some(5));
        assert_eq!(staff.tenure_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()), Some(6));
        assert_eq!(Staff::new(Role::Groomer, profile(None)).tenure(), None);
    }

    #[test]
    fn test_revive_unknown_role_falls_back() {
        let staff = Staff::revive_from_storage(StaffRow {
            id_funcionario: 4,
            nome: Some("Old Record".into()),
            cpf: Some("1".into()),
            telefone: None,
            email: None,
            cargo: Some("GERENTE".into()),
            salario_base: Some(1000.0),
            data_contratacao: None,
            ativo: None,
            data_cadastro: None,
        });
        assert_eq!(staff.role(), Role::Receptionist);
        assert_eq!(staff.profile().national_id(), "1");
        assert!(staff.profile().is_active());
        assert_eq!(staff.calculate_compensation(), 1000.0);
    }

    #[test]
    fn test_encoding_derives_discriminator_and_pay() {
        let staff = Staff::new(Role::Groomer, profile(Some(1000.0)));
        let map = decode(&staff.to_flat_json()).unwrap();
        assert_eq!(map["cargo"], "TOSADOR");
        assert_eq!(map["salarioCalculado"].parse::<f64>().unwrap(), 1200.0);
        assert_eq!(map["idFuncionario"], "null");
    }

    #[test]
    fn test_round_trip() {
        let mut p = profile(Some(2500.5));
        p.set_id(Some(8)).unwrap();
        p.set_phone(Some("1134567890")).unwrap();
        p.set_hire_date(NaiveDate::from_ymd_opt(2021, 1, 15)).unwrap();
        p.set_active(Some(false));
        let staff = Staff::new(Role::Veterinarian, p);
        let back = Staff::parse_validated(&decode(&staff.to_flat_json()).unwrap()).unwrap();
        assert_eq!(back, staff);
    }
}
