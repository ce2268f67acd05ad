//! Save a day of GLM events to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{Date32Builder, Float32Builder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{cli::create_progress_bar, glm::GlmEvent};

const CHUNK_SIZE: usize = 100_000;

pub fn save_events(events: &[GlmEvent], date: NaiveDate, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("lat", DataType::Float32, false),
        Field::new("lon", DataType::Float32, false),
        Field::new("energy", DataType::Float32, true),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::default(),
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
    let pb = create_progress_bar(events.len() as u64, "Writing parquet file".to_string());

    let date32 = days_since_epoch(date);

    for chunk in events.chunks(CHUNK_SIZE) {
        let mut date_builder = Date32Builder::with_capacity(chunk.len());
        let mut lat_builder = Float32Builder::with_capacity(chunk.len());
        let mut lon_builder = Float32Builder::with_capacity(chunk.len());
        let mut energy_builder = Float32Builder::with_capacity(chunk.len());

        for event in chunk {
            date_builder.append_value(date32);
            lat_builder.append_value(event.lat);
            lon_builder.append_value(event.lon);
            // missing energy is stored as null rather than NaN
            energy_builder.append_option(Some(event.energy).filter(|e| e.is_finite()));
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(date_builder.finish()),
                Arc::new(lat_builder.finish()),
                Arc::new(lon_builder.finish()),
                Arc::new(energy_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_with_message("Finished writing Parquet file");
    writer.close()?;

    Ok(())
}

// Days from 0001-01-01 (CE) to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

// -- Tests -------------------------------------------------------------------
