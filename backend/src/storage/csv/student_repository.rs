use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, STUDENTS_FILE, STUDENTS_HEADER};
use crate::domain::models::student::Student;
use crate::storage::traits::StudentStorage;

/// CSV-based student repository
#[derive(Clone)]
pub struct StudentRepository {
    connection: CsvConnection,
}

impl StudentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all students of an owner from their CSV file
    fn read_students(&self, owner_id: &str) -> Result<Vec<Student>> {
        self.connection
            .ensure_owner_file_exists(owner_id, STUDENTS_FILE, STUDENTS_HEADER)?;

        let file_path = self.connection.owner_file_path(owner_id, STUDENTS_FILE);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut students = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let created_at = record.get(3).unwrap_or("");
            let updated_at = record.get(4).unwrap_or("");
            let student = Student {
                id: record.get(0).unwrap_or("").to_string(),
                name: record.get(1).unwrap_or("").to_string(),
                owner_id: record.get(2).unwrap_or("").to_string(),
                created_at: DateTime::parse_from_rfc3339(created_at)
                    .with_context(|| format!("Invalid created_at in students.csv: {}", created_at))?
                    .with_timezone(&Utc),
                updated_at: DateTime::parse_from_rfc3339(updated_at)
                    .with_context(|| format!("Invalid updated_at in students.csv: {}", updated_at))?
                    .with_timezone(&Utc),
            };
            students.push(student);
        }

        Ok(students)
    }

    /// Write all students of an owner to their CSV file
    fn write_students(&self, owner_id: &str, students: &[Student]) -> Result<()> {
        let file_path = self.connection.owner_file_path(owner_id, STUDENTS_FILE);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(STUDENTS_HEADER)?;
            for student in students {
                csv_writer.write_record(&[
                    &student.id,
                    &student.name,
                    &student.owner_id,
                    &student.created_at.to_rfc3339(),
                    &student.updated_at.to_rfc3339(),
                ])?;
            }
            csv_writer.flush()?;
        }

        // Atomic move from temp to final file
        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl StudentStorage for StudentRepository {
    fn store_student(&self, student: &Student) -> Result<()> {
        let mut students = self.read_students(&student.owner_id)?;
        students.push(student.clone());
        students.sort_by(|a, b| a.name.cmp(&b.name));
        self.write_students(&student.owner_id, &students)?;

        info!("Stored student {} ({})", student.name, student.id);
        Ok(())
    }

    fn get_student(&self, owner_id: &str, student_id: &str) -> Result<Option<Student>> {
        let students = self.read_students(owner_id)?;
        Ok(students.into_iter().find(|s| s.id == student_id))
    }

    fn list_students(&self, owner_id: &str) -> Result<Vec<Student>> {
        let mut students = self.read_students(owner_id)?;
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    fn delete_student(&self, owner_id: &str, student_id: &str) -> Result<bool> {
        let mut students = self.read_students(owner_id)?;
        let before = students.len();
        students.retain(|s| s.id != student_id);

        if students.len() == before {
            return Ok(false);
        }

        self.write_students(owner_id, &students)?;
        info!("Deleted student {}", student_id);
        Ok(true)
    }
}
