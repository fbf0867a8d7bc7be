use serde::de::DeserializeOwned;

use super::documents::{
    CubeDefinition, DimensionDefinition, Load, MeasureGroupDefinition, PartitionDefinition,
    XmObject,
};
use super::{Fragment, FragmentError, FragmentKind, FragmentResult};

/// Turns the bytes of one manifest entry into a typed fragment.
pub trait FragmentLoader {
    fn load(&self, kind: FragmentKind, file: &str, bytes: &[u8]) -> FragmentResult<Fragment>;
}

/// Default loader: decodes the XML documents with `quick-xml`'s serde support.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFragmentLoader;

impl XmlFragmentLoader {
    pub fn new() -> Self {
        Self
    }
}

impl FragmentLoader for XmlFragmentLoader {
    fn load(&self, kind: FragmentKind, file: &str, bytes: &[u8]) -> FragmentResult<Fragment> {
        let text = decode_text(file, bytes)?;
        let fragment = match kind {
            FragmentKind::Cube => {
                Fragment::Cube(parse::<Load<CubeDefinition>>(file, text)?.definition.cube)
            }
            FragmentKind::Dimension => Fragment::Dimension(
                parse::<Load<DimensionDefinition>>(file, text)?
                    .definition
                    .dimension,
            ),
            FragmentKind::Partition => Fragment::Partition(
                parse::<Load<PartitionDefinition>>(file, text)?
                    .definition
                    .partition,
            ),
            FragmentKind::MeasureGroup => Fragment::MeasureGroup(
                parse::<Load<MeasureGroupDefinition>>(file, text)?
                    .definition
                    .measure_group,
            ),
            // Storage statistics have the object tree as document root
            FragmentKind::TableStats => Fragment::TableStats(parse::<XmObject>(file, text)?),
        };
        Ok(fragment)
    }
}

fn decode_text<'a>(file: &str, bytes: &'a [u8]) -> FragmentResult<&'a str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|_| FragmentError::Utf8 {
        file: file.to_string(),
    })
}

fn parse<T: DeserializeOwned>(file: &str, text: &str) -> FragmentResult<T> {
    quick_xml::de::from_str(text).map_err(|e| FragmentError::Decode {
        file: file.to_string(),
        message: e.to_string(),
    })
}
