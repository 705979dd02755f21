//! Readers for the fixed-schema collaborator tables.
//!
//! Every table here is produced outside the core (clusterer, classifiers,
//! featureCounts); readers validate the columns they need and fail with a
//! schema error when a table drifts. Row-level oddities are logged and
//! skipped instead.

use crate::cluster::Cluster;
use crate::count_table::FeatureKey;
use crate::errors::ProfilerError;
use anyhow::{Context, Result};
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// CAT per-rank columns, in lineage order. The first is the domain field
/// the normalizer later skips.
const CAT_RANK_COLUMNS: [&str; 7] = [
    "superkingdom",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "species",
];

/// vContact3 prediction columns, in lineage order. The first is the realm
/// field the normalizer later skips.
const VCONTACT3_RANK_COLUMNS: [&str; 6] = [
    "realm (prediction)",
    "phylum (prediction)",
    "class (prediction)",
    "order (prediction)",
    "family (prediction)",
    "genus (prediction)",
];

/// Reads the cluster membership table: one row per cluster,
/// `representative<TAB>member,member,...`, no header.
///
/// OVU identifiers are assigned from the row order (`OVU_0`, `OVU_1`, ...).
pub fn read_clusters(path: &Path) -> Result<Vec<Cluster>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open cluster table {:?}", path))?;

    let mut clusters = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(ProfilerError::schema(
                path,
                format!("cluster row {} has fewer than 2 columns", idx),
            )
            .into());
        }
        let representative = record.get(0).unwrap_or("").to_string();
        let members: Vec<String> = record
            .get(1)
            .unwrap_or("")
            .split(',')
            .map(str::to_string)
            .collect();
        clusters.push(Cluster {
            ovu_id: format!("OVU_{}", idx),
            representative,
            members,
        });
    }
    Ok(clusters)
}

/// Reads the CAT `contig2classification.with_names` table into
/// contig -> raw 7-field lineage string.
///
/// Named rank cells may carry a `": score"` confidence suffix, which is
/// stripped before the fields are `;`-joined.
pub fn read_cat_annotations(path: &Path) -> Result<HashMap<String, String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("failed to open CAT table {:?}", path))?;

    let headers = rdr.headers()?.clone();
    let contig_col = headers
        .iter()
        .position(|h| {
            let h = h.trim();
            h.eq_ignore_ascii_case("# contig") || h.eq_ignore_ascii_case("contig")
        })
        .ok_or_else(|| ProfilerError::schema(path, "missing '# contig' column"))?;
    let rank_cols = rank_column_indices(path, &headers, &CAT_RANK_COLUMNS)?;

    let mut annotations = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let contig = record.get(contig_col).unwrap_or("").trim();
        if contig.is_empty() {
            warn!("skipping CAT row with empty contig id in {:?}", path);
            continue;
        }
        let fields: Vec<&str> = rank_cols
            .iter()
            .map(|&col| strip_confidence(record.get(col).unwrap_or("")))
            .collect();
        annotations.insert(contig.to_string(), fields.join(";"));
    }
    Ok(annotations)
}

/// Reads the GeNomad taxonomy table into contig -> raw lineage string.
pub fn read_genomad_annotations(path: &Path) -> Result<HashMap<String, String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("failed to open GeNomad table {:?}", path))?;

    let headers = rdr.headers()?.clone();
    let seq_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("seq_name"))
        .ok_or_else(|| ProfilerError::schema(path, "missing 'seq_name' column"))?;
    let lineage_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("lineage"))
        .ok_or_else(|| ProfilerError::schema(path, "missing 'lineage' column"))?;

    let mut annotations = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let contig = record.get(seq_col).unwrap_or("").trim();
        if contig.is_empty() {
            warn!("skipping GeNomad row with empty seq_name in {:?}", path);
            continue;
        }
        annotations.insert(
            contig.to_string(),
            record.get(lineage_col).unwrap_or("").to_string(),
        );
    }
    Ok(annotations)
}

/// Reads the vContact3 `final_assignments` table into
/// genome -> raw 6-field lineage string.
///
/// Rows flagged as reference sequences describe database genomes, not
/// query contigs, and are excluded before the merge.
pub fn read_vcontact3_assignments(path: &Path) -> Result<HashMap<String, String>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open vContact3 table {:?}", path))?;

    let headers = rdr.headers()?.clone();
    let genome_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("GenomeName"))
        .ok_or_else(|| ProfilerError::schema(path, "missing 'GenomeName' column"))?;
    let reference_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("Reference"))
        .ok_or_else(|| ProfilerError::schema(path, "missing 'Reference' column"))?;
    let rank_cols = rank_column_indices(path, &headers, &VCONTACT3_RANK_COLUMNS)?;

    let mut assignments = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        if record
            .get(reference_col)
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case("true")
        {
            continue;
        }
        let genome = record.get(genome_col).unwrap_or("").trim();
        if genome.is_empty() {
            warn!("skipping vContact3 row with empty GenomeName in {:?}", path);
            continue;
        }
        let fields: Vec<&str> = rank_cols
            .iter()
            .map(|&col| record.get(col).unwrap_or(""))
            .collect();
        assignments.insert(genome.to_string(), fields.join(";"));
    }
    Ok(assignments)
}

/// Reads one featureCounts per-sample table into `(feature key, count)`
/// rows.
///
/// The table opens with one `#`-prefixed program line, then a header of
/// `Geneid Chr Start End Strand Length <bam>`; the seventh column holds
/// the fragment counts.
pub fn read_feature_counts(path: &Path) -> Result<Vec<(FeatureKey, f64)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_path(path)
        .with_context(|| format!("failed to open count table {:?}", path))?;

    let headers = rdr.headers()?.clone();
    let expected = ["Geneid", "Chr", "Start", "End", "Strand", "Length"];
    if headers.len() < 7 {
        return Err(ProfilerError::schema(
            path,
            format!("expected at least 7 columns, found {}", headers.len()),
        )
        .into());
    }
    for (idx, name) in expected.iter().enumerate() {
        let header = headers.get(idx).unwrap_or("");
        if !header.trim().eq_ignore_ascii_case(name) {
            return Err(ProfilerError::schema(
                path,
                format!("expected column {} to be '{}', found '{}'", idx, name, header),
            )
            .into());
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let parse_u64 = |idx: usize, name: &str| -> Result<u64> {
            record
                .get(idx)
                .unwrap_or("")
                .trim()
                .parse::<u64>()
                .with_context(|| format!("bad {} field in {:?}: {:?}", name, path, record))
        };
        let key = FeatureKey {
            contig: record.get(0).unwrap_or("").to_string(),
            chr: record.get(1).unwrap_or("").to_string(),
            start: parse_u64(2, "Start")?,
            end: parse_u64(3, "End")?,
            strand: record.get(4).unwrap_or("").to_string(),
            length: parse_u64(5, "Length")?,
        };
        let count = record
            .get(6)
            .unwrap_or("")
            .trim()
            .parse::<f64>()
            .with_context(|| format!("bad count field in {:?}: {:?}", path, record))?;
        rows.push((key, count));
    }
    Ok(rows)
}

/// Reads the mapping manifest (`fileHeader<TAB>fq1<TAB>fq2`, no header)
/// and returns the sample names in file order.
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open manifest {:?}", path))?;

    let mut samples = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let sample = record.get(0).unwrap_or("").trim();
        if sample.is_empty() {
            warn!("skipping manifest row with empty sample name in {:?}", path);
            continue;
        }
        samples.push(sample.to_string());
    }
    Ok(samples)
}

/// Resolves a named column set to indices, or fails with a schema error
/// naming the first absent column.
fn rank_column_indices(
    path: &Path,
    headers: &csv::StringRecord,
    names: &[&str],
) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    ProfilerError::schema(path, format!("missing '{}' column", name)).into()
                })
        })
        .collect()
}

/// Drops the `": score"` confidence suffix CAT appends to named ranks.
fn strip_confidence(cell: &str) -> &str {
    cell.split(':').next().unwrap_or("").trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        write!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_read_clusters_assigns_ovu_ids_in_row_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered_clusters.tsv");
        write_file(
            &path,
            "sampleA_k141_10\tsampleA_k141_10,sampleB_k141_3\nsampleB_k141_7\tsampleB_k141_7\n",
        );

        let clusters = read_clusters(&path).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].ovu_id, "OVU_0");
        assert_eq!(clusters[0].representative, "sampleA_k141_10");
        assert_eq!(clusters[0].size(), 2);
        assert_eq!(clusters[1].ovu_id, "OVU_1");
        assert_eq!(clusters[1].members, vec!["sampleB_k141_7".to_string()]);

        dir.close().unwrap();
    }

    #[test]
    fn test_read_clusters_rejects_single_column_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad_clusters.tsv");
        write_file(&path, "rep_only\n");

        assert!(read_clusters(&path).is_err());
        dir.close().unwrap();
    }

    #[test]
    fn test_read_cat_annotations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cat.txt");
        write_file(
            &path,
            "# contig\tclassification\tsuperkingdom\tphylum\tclass\torder\tfamily\tgenus\tspecies\n\
             c1\ttaxid\tViruses: 0.99\tUroviricota: 0.95\tCaudoviricetes\tno support\tno support\tno support\tno support\n",
        );

        let annotations = read_cat_annotations(&path).unwrap();
        assert_eq!(
            annotations["c1"],
            "Viruses;Uroviricota;Caudoviricetes;no support;no support;no support;no support"
        );
        dir.close().unwrap();
    }

    #[test]
    fn test_read_cat_missing_rank_column_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cat.txt");
        write_file(&path, "# contig\tsuperkingdom\tphylum\nc1\tViruses\tUroviricota\n");

        assert!(read_cat_annotations(&path).is_err());
        dir.close().unwrap();
    }

    #[test]
    fn test_read_genomad_annotations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taxonomy.tsv");
        write_file(
            &path,
            "seq_name\tn_genes_with_taxonomy\tlineage\n\
             c1\t5\tViruses;Duplodnaviria;Heunggongvirae;Uroviricota;Caudoviricetes\n",
        );

        let annotations = read_genomad_annotations(&path).unwrap();
        assert_eq!(
            annotations["c1"],
            "Viruses;Duplodnaviria;Heunggongvirae;Uroviricota;Caudoviricetes"
        );
        dir.close().unwrap();
    }

    #[test]
    fn test_read_vcontact3_excludes_reference_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("final_assignments.csv");
        write_file(
            &path,
            "index,GenomeName,Reference,realm (prediction),phylum (prediction),class (prediction),order (prediction),family (prediction),genus (prediction)\n\
             0,ref_genome,True,Duplodnaviria,Uroviricota,Caudoviricetes,,,\n\
             1,c1,False,Duplodnaviria,Uroviricota,Caudoviricetes,,Peduoviridae,\n",
        );

        let assignments = read_vcontact3_assignments(&path).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(
            assignments["c1"],
            "Duplodnaviria;Uroviricota;Caudoviricetes;;Peduoviridae;"
        );
        dir.close().unwrap();
    }

    #[test]
    fn test_read_feature_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("S1_count.tsv");
        write_file(
            &path,
            "# Program:featureCounts v2.0.1; Command:...\n\
             Geneid\tChr\tStart\tEnd\tStrand\tLength\t/out/S1/S1_sorted.bam\n\
             c1\tc1\t1\t1000\t+\t1000\t42\n\
             c2\tc2\t1\t500\t+\t500\t0\n",
        );

        let rows = read_feature_counts(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.contig, "c1");
        assert_eq!(rows[0].0.length, 1000);
        assert_eq!(rows[0].1, 42.0);
        assert_eq!(rows[1].1, 0.0);
        dir.close().unwrap();
    }

    #[test]
    fn test_read_feature_counts_schema_drift_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad_count.tsv");
        write_file(
            &path,
            "Geneid\tChrom\tStart\tEnd\tStrand\tLength\tbam\nc1\tc1\t1\t10\t+\t10\t1\n",
        );

        assert!(read_feature_counts(&path).is_err());
        dir.close().unwrap();
    }

    #[test]
    fn test_read_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.tsv");
        write_file(&path, "S1\ts1_R1.fq.gz\ts1_R2.fq.gz\nS2\ts2_R1.fq.gz\ts2_R2.fq.gz\n");

        let samples = read_manifest(&path).unwrap();
        assert_eq!(samples, vec!["S1".to_string(), "S2".to_string()]);
        dir.close().unwrap();
    }
}
