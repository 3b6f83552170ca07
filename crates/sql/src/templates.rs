//! Oracle Spatial query templates.
//!
//! Templates carry `{name}` substitution points that are resolved textually
//! before the statement is bound. Bind variables (`:file_nbr`, `:wkb_aoi`, ...)
//! are left for the executor.

use crate::error::SqlGenError;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("static regex"));

/// A named SQL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub text: &'static str,
}

impl QueryTemplate {
    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for caps in PLACEHOLDER_REGEX.captures_iter(self.text) {
            if let Some(m) = caps.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// Substitute every placeholder. Fails if any placeholder has no value.
    pub fn render(&self, substitutions: &[(&str, &str)]) -> Result<String, SqlGenError> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|p| !substitutions.iter().any(|(k, _)| k == p))
            .map(|p| format!("{{{}}}", p))
            .collect();
        if !missing.is_empty() {
            return Err(SqlGenError::UnresolvedPlaceholder {
                template: self.name,
                missing,
            });
        }

        // Single pass so substituted text is never re-scanned.
        let rendered = PLACEHOLDER_REGEX.replace_all(self.text, |caps: &regex::Captures| {
            let key = &caps[1];
            substitutions
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        });
        Ok(rendered.into_owned())
    }
}

/// Registry geometry for a keyed AOI, as WKT.
pub const AOI: QueryTemplate = QueryTemplate {
    name: "aoi",
    text: "
SELECT SDO_UTIL.TO_WKTGEOMETRY(a.SHAPE) SHAPE
FROM {registry} a
WHERE a.CROWN_LANDS_FILE = :file_nbr
    AND a.DISPOSITION_TRANSACTION_SID = :disp_id
    AND a.INTRID_SID = :parcel_id
",
};

/// Geometry column lookup in the spatial metadata catalog.
pub const GEOM_COL: QueryTemplate = QueryTemplate {
    name: "geom_col",
    text: "
SELECT column_name GEOM_NAME
FROM ALL_SDO_GEOM_METADATA
WHERE owner = :owner
    AND table_name = :tab_name
",
};

/// Single-row SRID probe.
pub const SRID: QueryTemplate = QueryTemplate {
    name: "srid",
    text: "
SELECT s.{geom_col}.sdo_srid SP_REF
FROM {tab} s
WHERE rownum = 1
",
};

/// Overlay against a registry AOI located by file number, disposition and parcel.
pub const OVERLAY: QueryTemplate = QueryTemplate {
    name: "overlay",
    text: "
SELECT {cols}
    CASE WHEN SDO_GEOM.SDO_DISTANCE(b.{geom_col}, a.SHAPE, {tolerance}) = 0
        THEN 'INTERSECT'
        ELSE 'Within {radius} m'
        END AS RESULT,
    SDO_UTIL.TO_WKTGEOMETRY(b.{geom_col}) SHAPE
FROM {registry} a, {tab} b
WHERE a.CROWN_LANDS_FILE = :file_nbr
    AND a.DISPOSITION_TRANSACTION_SID = :disp_id
    AND a.INTRID_SID = :parcel_id
    AND SDO_WITHIN_DISTANCE(b.{geom_col}, a.SHAPE, 'distance = {radius}') = 'TRUE'
    {def_query}
",
};

/// Overlay against an AOI supplied as WKB.
pub const OVERLAY_WKB: QueryTemplate = QueryTemplate {
    name: "overlay_wkb",
    text: "
SELECT {cols}
    CASE WHEN SDO_GEOM.SDO_DISTANCE(b.{geom_col}, SDO_GEOMETRY(:wkb_aoi, :srid_t), {tolerance}) = 0
        THEN 'INTERSECT'
        ELSE 'Within {radius} m'
        END AS RESULT,
    SDO_UTIL.TO_WKTGEOMETRY(b.{geom_col}) SHAPE
FROM {tab} b
WHERE SDO_WITHIN_DISTANCE(b.{geom_col}, SDO_GEOMETRY(:wkb_aoi, :srid), 'distance = {radius}') = 'TRUE'
    {def_query}
",
};

/// Classification plus predicate against a symbolic `AOI`, stored on the
/// feature summary.
pub const OVERLAY_FRAGMENT: QueryTemplate = QueryTemplate {
    name: "overlay_fragment",
    text: "CASE WHEN SDO_GEOM.SDO_DISTANCE(b.{geom_col}, AOI, {tolerance}) = 0 THEN 'INTERSECT' ELSE 'Within {radius} m' END AS RESULT WHERE SDO_WITHIN_DISTANCE(b.{geom_col}, AOI, 'distance = {radius}') = 'TRUE'{def_query}",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(SRID.placeholders(), vec!["geom_col", "tab"]);
        assert_eq!(
            OVERLAY_WKB.placeholders(),
            vec!["cols", "geom_col", "tolerance", "radius", "tab", "def_query"]
        );
        assert!(GEOM_COL.placeholders().is_empty());
    }

    #[test]
    fn test_render_srid_probe() {
        let sql = SRID
            .render(&[("geom_col", "GEOMETRY"), ("tab", "WHSE_X.TAB")])
            .unwrap();
        assert!(sql.contains("SELECT s.GEOMETRY.sdo_srid SP_REF"));
        assert!(sql.contains("FROM WHSE_X.TAB s"));
    }

    #[test]
    fn test_render_reports_missing_placeholders() {
        let err = SRID.render(&[("geom_col", "SHAPE")]).unwrap_err();
        match err {
            SqlGenError::UnresolvedPlaceholder { template, missing } => {
                assert_eq!(template, "srid");
                assert_eq!(missing, vec!["{tab}".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let sql = SRID
            .render(&[("geom_col", "{tab}"), ("tab", "T.X")])
            .unwrap();
        assert!(sql.contains("s.{tab}.sdo_srid"));
    }
}
