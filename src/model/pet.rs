use super::fields::{not_future, optional_text, positive_id, required_text, today, Fields};
use super::Record;
use crate::codec::{FlatMap, ObjectWriter, ToFlatJson};
use crate::error::ValidationError;
use crate::store::PetRow;
use crate::validation::within;
use chrono::{NaiveDate, NaiveDateTime};

const NAME_MAX: usize = 100;
const SPECIES_MAX: usize = 50;
const BREED_MAX: usize = 50;
const WEIGHT_MAX_KG: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    id: Option<i32>,
    owner_id: i32,
    name: String,
    species: String,
    breed: Option<String>,
    birth_date: Option<NaiveDate>,
    weight: Option<f64>,
    notes: Option<String>,
    registered_at: Option<NaiveDateTime>,
}

impl Pet {
    pub fn new(owner_id: i32, name: &str, species: &str) -> Result<Self, ValidationError> {
        let mut pet = Self {
            id: None,
            owner_id: 0,
            name: String::new(),
            species: String::new(),
            breed: None,
            birth_date: None,
            weight: None,
            notes: None,
            registered_at: None,
        };
        pet.set_owner_id(Some(owner_id))?;
        pet.set_name(name)?;
        pet.set_species(species)?;
        Ok(pet)
    }

    /// Build from decoded request fields. Whether the owner exists is checked
    /// by the caller against the customer store.
    pub fn parse_validated(fields: &FlatMap) -> Result<Self, ValidationError> {
        let owner_id = fields
            .parsed("idCliente")
            .ok_or_else(|| ValidationError::new("idCliente", "is required"))?;
        let mut pet = Self::new(
            owner_id,
            fields.text("nome").unwrap_or_default(),
            fields.text("especie").unwrap_or_default(),
        )?;
        pet.set_id(fields.parsed("idPet"))?;
        pet.set_breed(fields.text("raca"))?;
        pet.set_birth_date(fields.date("dataNascimento"))?;
        pet.set_weight(fields.parsed("peso"))?;
        pet.set_notes(fields.text("observacoes"));
        Ok(pet)
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i32>) -> Result<(), ValidationError> {
        self.id = positive_id("idPet", id)?;
        Ok(())
    }

    pub fn owner_id(&self) -> i32 {
        self.owner_id
    }

    pub fn set_owner_id(&mut self, owner_id: Option<i32>) -> Result<(), ValidationError> {
        match owner_id {
            Some(id) if id > 0 => {
                self.owner_id = id;
                Ok(())
            }
            Some(_) => Err(ValidationError::new("idCliente", "must be positive")),
            None => Err(ValidationError::new("idCliente", "is required")),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("nome", name, NAME_MAX)?;
        Ok(())
    }

    /// Upper-cased, e.g. "CAO".
    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn set_species(&mut self, species: &str) -> Result<(), ValidationError> {
        self.species = required_text("especie", species, SPECIES_MAX)?.to_uppercase();
        Ok(())
    }

    pub fn breed(&self) -> Option<&str> {
        self.breed.as_deref()
    }

    pub fn set_breed(&mut self, breed: Option<&str>) -> Result<(), ValidationError> {
        self.breed = optional_text("raca", breed, BREED_MAX)?;
        Ok(())
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn set_birth_date(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.birth_date = not_future("dataNascimento", date)?;
        Ok(())
    }

    /// Kilograms.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn set_weight(&mut self, weight: Option<f64>) -> Result<(), ValidationError> {
        if let Some(w) = weight {
            if !within(w, 0.0, WEIGHT_MAX_KG) {
                return Err(ValidationError::new("peso", "must be between 0 and 1000 kg"));
            }
        }
        self.weight = weight;
        Ok(())
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes(&mut self, notes: Option<&str>) {
        self.notes = notes.map(|n| n.trim().to_string());
    }

    pub fn registered_at(&self) -> Option<NaiveDateTime> {
        self.registered_at
    }

    /// Whole years since birth; `None` without a birth date.
    pub fn age(&self) -> Option<u32> {
        self.age_on(today())
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.map(|born| today.years_since(born).unwrap_or(0))
    }
}

impl Record for Pet {
    type Row = PetRow;
    const ENTITY: &'static str = "Pet";

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn to_row(&self) -> PetRow {
        PetRow {
            id_pet: self.id.unwrap_or_default(),
            id_cliente: Some(self.owner_id),
            nome: Some(self.name.clone()),
            especie: Some(self.species.clone()),
            raca: self.breed.clone(),
            data_nascimento: self.birth_date,
            peso: self.weight,
            observacoes: self.notes.clone(),
            data_cadastro: self.registered_at,
        }
    }

    fn revive_from_storage(row: PetRow) -> Self {
        Self {
            id: Some(row.id_pet),
            owner_id: row.id_cliente.unwrap_or_default(),
            name: row.nome.unwrap_or_default(),
            species: row.especie.unwrap_or_default(),
            breed: row.raca,
            birth_date: row.data_nascimento,
            weight: row.peso,
            notes: row.observacoes,
            registered_at: row.data_cadastro,
        }
    }
}

impl ToFlatJson for Pet {
    fn to_flat_json(&self) -> String {
        ObjectWriter::new()
            .opt_int("idPet", self.id.map(i64::from))
            .int("idCliente", i64::from(self.owner_id))
            .string("nome", &self.name)
            .string("especie", &self.species)
            .opt_string("raca", self.breed())
            .opt_date("dataNascimento", self.birth_date)
            .opt_float("peso", self.weight)
            .opt_string("observacoes", self.notes())
            .opt_datetime("dataCadastro", self.registered_at)
            .finish()
    }
}
