//! Per-classifier lineage string cleanup.
//!
//! Each classifier emits a `;`-joined lineage with its own number of
//! leading non-rank fields and its own missing-value markers. Normalizing
//! here means the merge step only ever sees the shared phylum..species
//! schema.

use super::{Lineage, Rank, RankValue};

/// Field cleanup profile for one classifier's lineage strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStyle {
    /// CAT `contig2classification` lineages: trailing `*` markers flag
    /// uncertain calls, and a lineage without a literal `Viruses` field
    /// carries no viral signal and is dropped whole.
    Cat,
    /// vContact3 `final_assignments` lineages: `novel` placeholders,
    /// `No Realm`/`No prediction` markers, and `|`-suffixed annotations.
    VContact3,
    /// GeNomad `taxonomy` lineages.
    GeNomad,
}

/// One classifier as a lineage source: display name, cleanup style, and the
/// number of leading non-rank fields before the phylum slot.
#[derive(Debug, Clone, Copy)]
pub struct LineageSource {
    pub name: &'static str,
    pub style: SourceStyle,
    pub leading_offset: usize,
}

/// The three classifier sources in consensus priority order.
pub const SOURCES: [LineageSource; 3] = [
    LineageSource {
        name: "CAT",
        style: SourceStyle::Cat,
        leading_offset: 1,
    },
    LineageSource {
        name: "vContact3",
        style: SourceStyle::VContact3,
        leading_offset: 1,
    },
    LineageSource {
        name: "GeNomad",
        style: SourceStyle::GeNomad,
        leading_offset: 3,
    },
];

impl LineageSource {
    /// Normalizes one raw lineage string into the six-rank schema.
    ///
    /// The raw string is `;`-split, cleaned per the source style, and the
    /// leading non-rank fields are skipped. A string with fewer than
    /// `leading_offset + 1` fields yields a fully empty lineage, as do
    /// ranks beyond the available fields; fields beyond species are
    /// ignored.
    ///
    /// # Arguments
    ///
    /// * `raw` - The raw lineage string as emitted by the classifier table.
    ///
    /// # Returns
    ///
    /// * `Lineage` - The cleaned six-slot lineage.
    pub fn normalize(&self, raw: &str) -> Lineage {
        let fields = self.clean_fields(raw);
        let mut lineage = Lineage::new();
        if fields.len() < self.leading_offset + 1 {
            return lineage;
        }
        for (rank, field) in Rank::ALL.iter().zip(fields[self.leading_offset..].iter()) {
            lineage.set(*rank, RankValue::parse(field));
        }
        lineage
    }

    /// Applies the source-specific field cleanup.
    ///
    /// The returned fields still carry the leading non-rank slots;
    /// classification of the residual sentinels (`nan`, `no support`)
    /// happens in [`RankValue::parse`]. Cleanup is a projection: applying
    /// it to already-clean fields changes nothing.
    pub(crate) fn clean_fields(&self, raw: &str) -> Vec<String> {
        let fields: Vec<&str> = raw.split(';').collect();
        match self.style {
            SourceStyle::Cat => {
                let stripped: Vec<String> =
                    fields.iter().map(|field| field.replace('*', "")).collect();
                if !stripped.iter().any(|field| field == "Viruses") {
                    return vec![String::new(); 7];
                }
                stripped
            }
            SourceStyle::VContact3 => fields
                .into_iter()
                .map(|field| {
                    if field.contains("novel")
                        || field == "No Realm"
                        || field == "No prediction"
                    {
                        String::new()
                    } else {
                        field.split('|').next().unwrap_or("").to_string()
                    }
                })
                .collect(),
            SourceStyle::GeNomad => fields.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(style: SourceStyle) -> LineageSource {
        SOURCES
            .iter()
            .copied()
            .find(|s| s.style == style)
            .unwrap()
    }

    #[test]
    fn test_cat_offset_and_star_strip() {
        let cat = source(SourceStyle::Cat);
        let raw = "Viruses;Uroviricota*;Caudoviricetes;no support;nan;;";
        let lineage = cat.normalize(raw);

        assert_eq!(
            lineage.get(Rank::Phylum),
            &RankValue::Value("Uroviricota".to_string())
        );
        assert_eq!(
            lineage.get(Rank::Class),
            &RankValue::Value("Caudoviricetes".to_string())
        );
        assert_eq!(lineage.get(Rank::Order), &RankValue::NoSupport);
        assert_eq!(lineage.get(Rank::Family), &RankValue::Missing);
        assert_eq!(lineage.deepest_valid(), Some(Rank::Class));
    }

    #[test]
    fn test_cat_without_viruses_is_discarded() {
        let cat = source(SourceStyle::Cat);
        let raw = "Bacteria;Pseudomonadota;Gammaproteobacteria;Enterobacterales;Enterobacteriaceae;Escherichia;Escherichia coli";
        let lineage = cat.normalize(raw);
        assert!(lineage.is_empty());
        assert_eq!(lineage.to_string(), ";;;;;");
    }

    #[test]
    fn test_cat_starred_viruses_token_still_counts() {
        let cat = source(SourceStyle::Cat);
        // The `*` strip runs before the domain gate.
        let lineage = cat.normalize("Viruses*;Uroviricota;;;;;");
        assert_eq!(lineage.deepest_valid(), Some(Rank::Phylum));
    }

    #[test]
    fn test_vcontact3_cleanup() {
        let vc3 = source(SourceStyle::VContact3);
        let raw = "Duplodnaviria;Uroviricota|ref_37;novel_genus_123;No prediction;Peduoviridae;No Realm";
        let lineage = vc3.normalize(raw);

        // Realm field skipped, `|` suffix stripped, markers cleared.
        assert_eq!(
            lineage.get(Rank::Phylum),
            &RankValue::Value("Uroviricota".to_string())
        );
        assert_eq!(lineage.get(Rank::Class), &RankValue::Missing);
        assert_eq!(lineage.get(Rank::Order), &RankValue::Missing);
        assert_eq!(
            lineage.get(Rank::Family),
            &RankValue::Value("Peduoviridae".to_string())
        );
        assert_eq!(lineage.get(Rank::Genus), &RankValue::Missing);
        // vContact3 emits no species field.
        assert_eq!(lineage.get(Rank::Species), &RankValue::Missing);
    }

    #[test]
    fn test_genomad_offset_skips_three_fields() {
        let genomad = source(SourceStyle::GeNomad);
        let raw = "Viruses;Duplodnaviria;Heunggongvirae;Uroviricota;Caudoviricetes";
        let lineage = genomad.normalize(raw);

        assert_eq!(
            lineage.get(Rank::Phylum),
            &RankValue::Value("Uroviricota".to_string())
        );
        assert_eq!(
            lineage.get(Rank::Class),
            &RankValue::Value("Caudoviricetes".to_string())
        );
        assert_eq!(lineage.deepest_valid(), Some(Rank::Class));
    }

    #[test]
    fn test_too_few_fields_yields_empty_lineage() {
        assert!(source(SourceStyle::Cat).normalize("nan").is_empty());
        assert!(source(SourceStyle::VContact3).normalize("").is_empty());
        // GeNomad needs at least four fields to reach the phylum slot.
        assert!(source(SourceStyle::GeNomad)
            .normalize("Viruses;Duplodnaviria;Heunggongvirae")
            .is_empty());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        for style in [SourceStyle::Cat, SourceStyle::VContact3, SourceStyle::GeNomad] {
            let src = source(style);
            let raw = "Viruses;Uroviricota*;Caudoviricetes|x;novel_y;no support;nan;";
            let once = src.clean_fields(raw);
            let twice = src.clean_fields(&once.join(";"));
            assert_eq!(once, twice, "cleanup not idempotent for {:?}", style);
        }
    }

    #[test]
    fn test_extra_deep_fields_are_ignored() {
        let genomad = source(SourceStyle::GeNomad);
        // Nine rank fields after the offset; only six slots exist.
        let raw = "a;b;c;p;cl;o;f;g;s;extra1;extra2";
        let lineage = genomad.normalize(raw);
        assert_eq!(
            lineage.get(Rank::Species),
            &RankValue::Value("s".to_string())
        );
    }
}
