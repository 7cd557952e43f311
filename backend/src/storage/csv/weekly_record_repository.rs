use anyhow::Result;
use csv::{Reader, Writer};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, WEEKLY_RECORDS_FILE, WEEKLY_RECORDS_HEADER};
use crate::domain::models::weekly_record::WeeklyRecord;
use crate::storage::traits::WeeklyRecordStorage;

/// CSV-based weekly ledger record repository.
///
/// Rates are optional columns; an empty cell means "no stored rate" and
/// is distinct from an explicit 0.
#[derive(Clone)]
pub struct WeeklyRecordRepository {
    connection: CsvConnection,
}

impl WeeklyRecordRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_records(&self, owner_id: &str) -> Result<Vec<WeeklyRecord>> {
        self.connection.ensure_owner_file_exists(
            owner_id,
            WEEKLY_RECORDS_FILE,
            WEEKLY_RECORDS_HEADER,
        )?;

        let file_path = self
            .connection
            .owner_file_path(owner_id, WEEKLY_RECORDS_FILE);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.records() {
            let row = result?;

            let optional_rate = |index: usize| {
                row.get(index)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse::<f64>().ok())
            };

            let record = WeeklyRecord {
                id: row.get(0).unwrap_or("").to_string(),
                student_id: row.get(1).unwrap_or("").to_string(),
                owner_id: row.get(2).unwrap_or("").to_string(),
                week_number: row.get(3).unwrap_or("0").parse().unwrap_or(0),
                month: row.get(4).unwrap_or("0").parse().unwrap_or(0),
                year: row.get(5).unwrap_or("0").parse().unwrap_or(0),
                individual_hours: row.get(6).unwrap_or("0").parse().unwrap_or(0.0),
                group_hours: row.get(7).unwrap_or("0").parse().unwrap_or(0.0),
                individual_rate: optional_rate(8),
                group_rate: optional_rate(9),
            };
            records.push(record);
        }

        Ok(records)
    }

    fn write_records(&self, owner_id: &str, records: &[WeeklyRecord]) -> Result<()> {
        let file_path = self
            .connection
            .owner_file_path(owner_id, WEEKLY_RECORDS_FILE);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(WEEKLY_RECORDS_HEADER)?;
            for record in records {
                let week_number = record.week_number.to_string();
                let month = record.month.to_string();
                let year = record.year.to_string();
                let individual_hours = record.individual_hours.to_string();
                let group_hours = record.group_hours.to_string();
                let individual_rate = record
                    .individual_rate
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                let group_rate = record.group_rate.map(|r| r.to_string()).unwrap_or_default();
                csv_writer.write_record(&[
                    record.id.as_str(),
                    record.student_id.as_str(),
                    record.owner_id.as_str(),
                    week_number.as_str(),
                    month.as_str(),
                    year.as_str(),
                    individual_hours.as_str(),
                    group_hours.as_str(),
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

impl WeeklyRecordStorage for WeeklyRecordRepository {
    fn store_record(&self, record: &WeeklyRecord) -> Result<()> {
        let mut records = self.read_records(&record.owner_id)?;

        // At most one record per (student, week, month, year)
        if records.iter().any(|r| r.key() == record.key()) {
            return Err(anyhow::anyhow!(
                "Weekly record already exists for student {} week {}/{}/{}",
                record.student_id,
                record.week_number,
                record.month,
                record.year
            ));
        }

        records.push(record.clone());
        self.write_records(&record.owner_id, &records)?;

        info!(
            "Stored weekly record {} for student {} week {}",
            record.id, record.student_id, record.week_number
        );
        Ok(())
    }

    fn get_record(&self, owner_id: &str, record_id: &str) -> Result<Option<WeeklyRecord>> {
        let records = self.read_records(owner_id)?;
        Ok(records.into_iter().find(|r| r.id == record_id))
    }

    fn list_records_for_month(
        &self,
        owner_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<WeeklyRecord>> {
        let mut records: Vec<WeeklyRecord> = self
            .read_records(owner_id)?
            .into_iter()
            .filter(|r| r.month == month && r.year == year)
            .collect();
        records.sort_by(|a, b| {
            a.week_number
                .cmp(&b.week_number)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        Ok(records)
    }

    fn list_records_for_student(
        &self,
        owner_id: &str,
        student_id: &str,
    ) -> Result<Vec<WeeklyRecord>> {
        Ok(self
            .read_records(owner_id)?
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect())
    }

    fn update_record(&self, record: &WeeklyRecord) -> Result<()> {
        let mut records = self.read_records(&record.owner_id)?;
        let position = records.iter().position(|r| r.id == record.id);

        match position {
            Some(index) => {
                records[index] = record.clone();
                self.write_records(&record.owner_id, &records)?;
                info!("Updated weekly record {}", record.id);
                Ok(())
            }
            None => Err(anyhow::anyhow!(
                "Weekly record not found for update: {}",
                record.id
            )),
        }
    }

    fn delete_records_for_student(&self, owner_id: &str, student_id: &str) -> Result<u32> {
        let mut records = self.read_records(owner_id)?;
        let before = records.len();
        records.retain(|r| r.student_id != student_id);
        let deleted = (before - records.len()) as u32;

        if deleted > 0 {
            self.write_records(owner_id, &records)?;
            info!("Deleted {} weekly records for student {}", deleted, student_id);
        }
        Ok(deleted)
    }
}
