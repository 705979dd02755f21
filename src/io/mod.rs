//! Input/Output operations module.
//!
//! Handles reading the collaborator tables (cluster membership, classifier
//! annotations, per-sample counts) and writing the per-cluster summary and
//! abundance tables downstream consumers parse.

pub mod fasta;
pub mod tables;

use crate::cluster::ClusterRecord;
use crate::count_table::FeatureKey;
use anyhow::Result;
use ndarray::Array2;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes the per-cluster summary records to a CSV file.
///
/// Column order is part of the output contract:
/// `OVU,representative_contig,cluster_size,cluster_length,
/// cluster_median_length,cluster_mean_length,lineage,contigs_in_cluster`.
///
/// # Arguments
///
/// * `records` - The per-cluster records, already in output order.
/// * `output_path` - The path to the output CSV file.
///
/// # Returns
///
/// * `Result<()>` - Ok(()) if writing was successful, or an error.
pub fn write_cluster_records(records: &[ClusterRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    writer.write_record([
        "OVU",
        "representative_contig",
        "cluster_size",
        "cluster_length",
        "cluster_median_length",
        "cluster_mean_length",
        "lineage",
        "contigs_in_cluster",
    ])?;

    for record in records {
        writer.write_record(&[
            record.ovu_id.clone(),
            record.representative.clone(),
            record.cluster_size.to_string(),
            record.cluster_length.to_string(),
            format_float(record.cluster_median_length),
            format_float(record.cluster_mean_length),
            record.lineage.clone(),
            record.members.join(","),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes one abundance table (raw counts, FPKM, or TPM) to a CSV file.
///
/// The six feature-key columns come first, then one column per sample.
///
/// # Arguments
///
/// * `features` - Row keys in matrix row order.
/// * `sample_names` - Column names in matrix column order.
/// * `matrix` - The (features x samples) value matrix.
/// * `output_path` - The path to the output CSV file.
///
/// # Returns
///
/// * `Result<()>` - Ok(()) if writing was successful, or an error.
pub fn write_abundance_table(
    features: &[FeatureKey],
    sample_names: &[String],
    matrix: &Array2<f64>,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let mut header = vec![
        "contig".to_string(),
        "Chr".to_string(),
        "Start".to_string(),
        "End".to_string(),
        "Strand".to_string(),
        "Length".to_string(),
    ];
    header.extend(sample_names.iter().cloned());
    writer.write_record(&header)?;

    let (n_features, n_samples) = matrix.dim();
    for r in 0..n_features {
        let key = &features[r];
        let mut record = Vec::with_capacity(6 + n_samples);
        record.push(key.contig.clone());
        record.push(key.chr.clone());
        record.push(key.start.to_string());
        record.push(key.end.to_string());
        record.push(key.strand.clone());
        record.push(key.length.to_string());
        for c in 0..n_samples {
            record.push(format_float(matrix[[r, c]]));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Formats one float cell; NaN renders as an empty field.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count_table::CountTable;
    use std::fs;
    use tempfile::tempdir;

    fn sample_record() -> ClusterRecord {
        ClusterRecord {
            ovu_id: "OVU_0".to_string(),
            representative: "c1".to_string(),
            cluster_size: 3,
            cluster_length: 600,
            cluster_median_length: 200.0,
            cluster_mean_length: 200.0,
            lineage: "Uroviricota;Caudoviricetes;;;;".to_string(),
            members: vec!["c1".to_string(), "c2".to_string(), "c3".to_string()],
        }
    }

    #[test]
    fn test_write_cluster_records_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OVU_info.csv");

        write_cluster_records(&[sample_record()], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected = "\
OVU,representative_contig,cluster_size,cluster_length,cluster_median_length,cluster_mean_length,lineage,contigs_in_cluster\n\
OVU_0,c1,3,600,200,200,Uroviricota;Caudoviricetes;;;;,\"c1,c2,c3\"\n";
        assert_eq!(content, expected);

        dir.close().unwrap();
    }

    #[test]
    fn test_write_cluster_records_nan_median_renders_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OVU_info.csv");
        let mut record = sample_record();
        record.cluster_median_length = f64::NAN;

        write_cluster_records(&[record], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("OVU_0,c1,3,600,,200,"));
        dir.close().unwrap();
    }

    #[test]
    fn test_write_abundance_table_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("all_count.csv");

        let table = CountTable::assemble(vec![
            (
                "S1".to_string(),
                vec![(crate::count_table::tests::key("c1", 1000), 10.0)],
            ),
            (
                "S2".to_string(),
                vec![(crate::count_table::tests::key("c1", 1000), 4.0)],
            ),
        ])
        .unwrap();

        write_abundance_table(
            table.features(),
            table.sample_names(),
            table.counts_matrix(),
            &path,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected = "\
contig,Chr,Start,End,Strand,Length,S1,S2\n\
c1,c1,1,1000,+,1000,10,4\n";
        assert_eq!(content, expected);

        dir.close().unwrap();
    }
}
