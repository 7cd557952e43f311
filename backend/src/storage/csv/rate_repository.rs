use anyhow::Result;
use csv::{Reader, Writer};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, RATES_FILE, RATES_HEADER};
use crate::domain::models::rate::StudentRate;
use crate::storage::traits::RateStorage;

/// CSV-based rate override repository. One row per student at most.
#[derive(Clone)]
pub struct RateRepository {
    connection: CsvConnection,
}

impl RateRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rates(&self, owner_id: &str) -> Result<Vec<StudentRate>> {
        self.connection
            .ensure_owner_file_exists(owner_id, RATES_FILE, RATES_HEADER)?;

        let file_path = self.connection.owner_file_path(owner_id, RATES_FILE);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut rates = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let optional_rate = |index: usize| {
                record
                    .get(index)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse::<f64>().ok())
            };

            rates.push(StudentRate {
                student_id: record.get(0).unwrap_or("").to_string(),
                individual_rate: optional_rate(1),
                group_rate: optional_rate(2),
            });
        }

        Ok(rates)
    }

    fn write_rates(&self, owner_id: &str, rates: &[StudentRate]) -> Result<()> {
        let file_path = self.connection.owner_file_path(owner_id, RATES_FILE);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(RATES_HEADER)?;
            for rate in rates {
                let individual_rate = rate
                    .individual_rate
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                let group_rate = rate.group_rate.map(|r| r.to_string()).unwrap_or_default();
                csv_writer.write_record(&[
                    rate.student_id.as_str(),
                    individual_rate.as_str(),
                    group_rate.as_str(),
                ])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl RateStorage for RateRepository {
    fn store_rate(&self, owner_id: &str, rate: &StudentRate) -> Result<()> {
        let mut rates = self.read_rates(owner_id)?;

        // Replace any existing override for the student
        rates.retain(|r| r.student_id != rate.student_id);
        rates.push(rate.clone());
        rates.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        self.write_rates(owner_id, &rates)?;

        info!("Stored rate override for student {}", rate.student_id);
        Ok(())
    }

    fn get_rate(&self, owner_id: &str, student_id: &str) -> Result<Option<StudentRate>> {
        let rates = self.read_rates(owner_id)?;
        Ok(rates.into_iter().find(|r| r.student_id == student_id))
    }

    fn list_rates(&self, owner_id: &str) -> Result<Vec<StudentRate>> {
        self.read_rates(owner_id)
    }

    fn delete_rate(&self, owner_id: &str, student_id: &str) -> Result<bool> {
        let mut rates = self.read_rates(owner_id)?;
        let before = rates.len();
        rates.retain(|r| r.student_id != student_id);

        if rates.len() == before {
            return Ok(false);
        }

        self.write_rates(owner_id, &rates)?;
        info!("Deleted rate override for student {}", student_id);
        Ok(true)
    }
}
