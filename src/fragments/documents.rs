//! Typed metadata fragment documents.
//!
//! Field names follow the XML element names of the analysis-services object
//! definitions (`<Load><ObjectDefinition><Cube>...`). Unknown elements are
//! ignored so newer document versions still decode.

use serde::Deserialize;

/// `<Load>` envelope around one object definition.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Load<D> {
    #[serde(rename = "ObjectDefinition")]
    pub definition: D,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CubeDefinition {
    #[serde(rename = "Cube")]
    pub cube: Cube,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DimensionDefinition {
    #[serde(rename = "Dimension")]
    pub dimension: Dimension,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PartitionDefinition {
    #[serde(rename = "Partition")]
    pub partition: Partition,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MeasureGroupDefinition {
    #[serde(rename = "MeasureGroup")]
    pub measure_group: MeasureGroup,
}

// ============================================================================
// Cube (root)
// ============================================================================

/// The root cube definition; lists every table as a cube dimension.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cube {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Dimensions", default)]
    pub dimensions: CubeDimensions,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CubeDimensions {
    #[serde(rename = "Dimension", default)]
    pub items: Vec<CubeDimension>,
}

/// A reference from the cube to a dimension fragment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CubeDimension {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "DimensionID", default)]
    pub dimension_id: String,
    #[serde(rename = "Visible")]
    pub visible: Option<bool>,
}

impl CubeDimension {
    /// The dimension fragment this entry points at; older documents only
    /// carry `ID`.
    pub fn target_id(&self) -> &str {
        if self.dimension_id.is_empty() {
            &self.id
        } else {
            &self.dimension_id
        }
    }
}

// ============================================================================
// Dimension
// ============================================================================

/// One table's column definitions and outgoing relationships.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Dimension {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "LastProcessed")]
    pub last_processed: Option<String>,
    #[serde(rename = "LastSchemaUpdate")]
    pub last_schema_update: Option<String>,
    #[serde(rename = "Attributes", default)]
    pub attributes: Attributes,
    #[serde(rename = "Relationships", default)]
    pub relationships: Relationships,
}

impl Dimension {
    /// Name of the attribute with identifier `attribute_id`.
    pub fn attribute_name(&self, attribute_id: &str) -> Option<&str> {
        self.attributes
            .items
            .iter()
            .find(|a| a.id == attribute_id)
            .map(|a| a.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attributes {
    #[serde(rename = "Attribute", default)]
    pub items: Vec<Attribute>,
}

/// One column definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attribute {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "KeyColumns", default)]
    pub key_columns: KeyColumns,
}

impl Attribute {
    /// Declared type of the first key column that has one.
    pub fn declared_type(&self) -> Option<&str> {
        self.key_columns
            .items
            .iter()
            .filter_map(|k| k.data_type.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyColumns {
    #[serde(rename = "KeyColumn", default)]
    pub items: Vec<KeyColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyColumn {
    #[serde(rename = "DataType")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Relationships {
    #[serde(rename = "Relationship", default)]
    pub items: Vec<DimensionRelationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DimensionRelationship {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Visible")]
    pub visible: Option<bool>,
    #[serde(rename = "FromRelationshipEnd")]
    pub from_end: Option<RelationshipEnd>,
    #[serde(rename = "ToRelationshipEnd")]
    pub to_end: Option<RelationshipEnd>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelationshipEnd {
    #[serde(rename = "DimensionID", default)]
    pub dimension_id: String,
    #[serde(rename = "Multiplicity")]
    pub multiplicity: Option<String>,
    #[serde(rename = "Attributes", default)]
    pub attributes: EndAttributes,
}

impl RelationshipEnd {
    /// Identifier of the first endpoint attribute.
    pub fn attribute_id(&self) -> Option<&str> {
        self.attributes
            .items
            .first()
            .map(|a| a.attribute_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndAttributes {
    #[serde(rename = "Attribute", default)]
    pub items: Vec<EndAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndAttribute {
    #[serde(rename = "AttributeID", default)]
    pub attribute_id: String,
}

// ============================================================================
// Partition
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Partition {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Source")]
    pub source: Option<PartitionSource>,
}

/// Query or column binding of a partition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartitionSource {
    #[serde(rename = "QueryDefinition")]
    pub query_definition: Option<String>,
    #[serde(rename = "ColumnID")]
    pub column_id: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<Box<PartitionSource>>,
}

impl PartitionSource {
    /// The data-source expression: the query definition, or `[<ColumnID>]`
    /// for column-bound sources.
    pub fn expression(&self) -> Option<String> {
        if let Some(query) = self.query_definition.as_deref() {
            return Some(query.to_string());
        }
        let column = self
            .source
            .as_ref()
            .and_then(|s| s.column_id.as_deref())
            .or(self.column_id.as_deref())?;
        Some(format!("[{}]", column))
    }
}

// ============================================================================
// Measure group
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeasureGroup {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Measures", default)]
    pub measures: Measures,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Measures {
    #[serde(rename = "Measure", default)]
    pub items: Vec<MeasureDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeasureDefinition {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "MeasureExpression")]
    pub expression: Option<String>,
    #[serde(rename = "DisplayFolder")]
    pub display_folder: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

// ============================================================================
// Table storage statistics (`XMObject` tree)
// ============================================================================

/// A node of the storage-engine object tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmObject {
    #[serde(rename = "@class", default)]
    pub class_name: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "Properties", default)]
    pub properties: XmProperties,
    #[serde(rename = "Collections", default)]
    pub collections: XmCollections,
    #[serde(rename = "Members", default)]
    pub members: XmMembers,
}

impl XmObject {
    /// The raw column object named `column` in the `Columns` collection.
    pub fn raw_column(&self, column: &str) -> Option<&XmObject> {
        self.collections
            .items
            .iter()
            .filter(|c| c.name == "Columns")
            .flat_map(|c| c.objects.iter())
            .find(|o| o.name == column && o.class_name == "XMRawColumn")
    }

    /// Properties of the member named `member`, if it has an object.
    pub fn member_properties(&self, member: &str) -> Option<&XmProperties> {
        self.members
            .items
            .iter()
            .find(|m| m.name == member)
            .and_then(|m| m.object.as_deref())
            .map(|o| &o.properties)
    }

    /// Properties of every member object.
    pub fn all_member_properties(&self) -> impl Iterator<Item = &XmProperties> {
        self.members
            .items
            .iter()
            .filter_map(|m| m.object.as_deref())
            .map(|o| &o.properties)
    }
}

/// The subset of storage properties the reconciler reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmProperties {
    #[serde(rename = "DistinctDataIDs")]
    pub distinct_data_ids: Option<i64>,
    #[serde(rename = "MinDataID")]
    pub min_data_id: Option<i64>,
    #[serde(rename = "MaxDataID")]
    pub max_data_id: Option<i64>,
    #[serde(rename = "HasNulls")]
    pub has_nulls: Option<bool>,
    #[serde(rename = "RLERuns")]
    pub rle_runs: Option<i64>,
    #[serde(rename = "CompressionType")]
    pub compression_type: Option<i64>,
    #[serde(rename = "BaseId")]
    pub base_id: Option<i64>,
    #[serde(rename = "Magnitude")]
    pub magnitude: Option<f64>,
    #[serde(rename = "IsNullable")]
    pub is_nullable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmCollections {
    #[serde(rename = "Collection", default)]
    pub items: Vec<XmCollection>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmCollection {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "XMObject", default)]
    pub objects: Vec<XmObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmMembers {
    #[serde(rename = "Member", default)]
    pub items: Vec<XmMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct XmMember {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "XMObject")]
    pub object: Option<Box<XmObject>>,
}
