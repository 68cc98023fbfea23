use serde::{Deserialize, Serialize};

/// Fields it never makes sense to graph
const BLACKLISTED_FIELDS: &[&str] = &["time", "loopIteration"];

/// Colors handed out to fields in order
pub const PALETTE: &[(&str, &str)] = &[
    ("Blue", "#1f77b4"),
    ("Orange", "#ff7f0e"),
    ("Green", "#2ca02c"),
    ("Red", "#d62728"),
    ("Purple", "#9467bd"),
    ("Brown", "#8c564b"),
    ("Pink", "#e377c2"),
    ("Grey", "#7f7f7f"),
    ("Olive", "#bcbd22"),
    ("Cyan", "#17becf"),
];

pub const MIN_GRAPH_HEIGHT: u8 = 1;
pub const MAX_GRAPH_HEIGHT: u8 = 5;

/// Palette color for the n-th field of a graph
pub fn palette_color(index: usize) -> String {
    PALETTE[index % PALETTE.len()].1.to_string()
}

/// Response curve applied to a field before drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    /// 0.0-1.0, lower values exaggerate center values
    pub power: f64,
    /// 0.0-1.0, fraction of the graph height used
    pub output_range: f64,
}

impl Curve {
    pub fn new(power: f64, output_range: f64) -> Self {
        Self {
            power: power.clamp(0.0, 1.0),
            output_range: output_range.clamp(0.0, 1.0),
        }
    }
}

/// A single plotted field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Smoothing window in microseconds
    #[serde(default)]
    pub smoothing: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
}

impl Field {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            smoothing: 0,
            curve: None,
        }
    }

    /// A field with no name is an editing placeholder
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty()
    }
}

fn default_height() -> u8 {
    MIN_GRAPH_HEIGHT
}

/// One graph panel: a label, a relative height and its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_height")]
    pub height: u8,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Graph {
    pub fn new(label: &str, fields: Vec<Field>) -> Self {
        Self {
            label: label.to_string(),
            height: MIN_GRAPH_HEIGHT,
            fields,
        }
    }
}

/// The ordered set of graphs on screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphConfig {
    graphs: Vec<Graph>,
}

impl GraphConfig {
    pub fn new(graphs: Vec<Graph>) -> Self {
        Self { graphs }
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn graph(&self, index: usize) -> Option<&Graph> {
        self.graphs.get(index)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Names of every field across all graphs, in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.iter().flat_map(|g| g.fields.iter().map(|f| f.name.as_str()))
    }

    /// Copy suitable for persisting: placeholder fields are dropped and
    /// heights are clamped to the supported range.
    pub fn sanitized(&self) -> Self {
        let graphs = self
            .graphs
            .iter()
            .map(|graph| Graph {
                label: graph.label.clone(),
                height: graph.height.clamp(MIN_GRAPH_HEIGHT, MAX_GRAPH_HEIGHT),
                fields: graph.fields.iter().filter(|f| !f.is_placeholder()).cloned().collect(),
            })
            .collect();
        Self { graphs }
    }

    /// Split the graph at `index` into one graph per field, each labelled
    /// with its field's name.
    pub fn expanded(&self, index: usize) -> Option<Self> {
        let graph = self.graphs.get(index)?;
        let graphs = graph
            .fields
            .iter()
            .map(|field| Graph::new(&field.name, vec![field.clone()]))
            .collect();
        Some(Self { graphs })
    }

    /// Just the graph at `index`, with all of its fields
    pub fn collapsed(&self, index: usize) -> Option<Self> {
        let graph = self.graphs.get(index)?;
        Some(Self {
            graphs: vec![Graph::new(&graph.label, graph.fields.clone())],
        })
    }

    /// Example layout built from the fields a log actually carries.
    ///
    /// Each requested label picks up the fields whose root name matches it
    /// ("Motors" takes `motor[0]`, `motor[1]`...). Labels without matching
    /// fields are skipped; if nothing matches, the first graphable field is
    /// used so a fresh install still shows something.
    pub fn example(log_fields: &[String], labels: &[&str]) -> Self {
        let mut graphs = Vec::new();

        for label in labels {
            let root = example_root(label);
            let fields: Vec<Field> = log_fields
                .iter()
                .filter(|name| field_root(name) == root)
                .enumerate()
                .map(|(i, name)| Field::new(name, &palette_color(i)))
                .collect();

            if !fields.is_empty() {
                graphs.push(Graph::new(label, fields));
            }
        }

        if graphs.is_empty() {
            if let Some(name) = log_fields.iter().find(|n| is_graphable(n)) {
                graphs.push(Graph::new(name, vec![Field::new(name, &palette_color(0))]));
            }
        }

        Self { graphs }
    }
}

fn example_root(label: &str) -> &str {
    match label {
        "Motors" => "motor",
        "Gyros" => "gyroADC",
        "Servos" => "servo",
        "RC Command" => "rcCommand",
        "PIDs" => "axisP",
        other => other,
    }
}

/// `motor[2]` -> `motor`, anything else unchanged
fn field_root(name: &str) -> &str {
    match name.find('[') {
        Some(pos) if name.ends_with(']') => &name[..pos],
        _ => name,
    }
}

fn is_graphable(name: &str) -> bool {
    !BLACKLISTED_FIELDS.contains(&name)
}

/// Field names to offer when editing a configuration.
///
/// Indexed families (`motor[0]`, `motor[1]`) get a leading `motor[all]`
/// entry. Fields used by `config` but missing from this log are appended so
/// editing a config built for another craft does not silently drop them.
pub fn offered_field_names(log_fields: &[String], config: &GraphConfig) -> Vec<String> {
    let mut offered: Vec<String> = Vec::new();
    let mut last_root: Option<&str> = None;

    for name in log_fields.iter().filter(|n| is_graphable(n)) {
        let root = field_root(name);
        if root != name.as_str() {
            if last_root != Some(root) {
                offered.push(format!("{}[all]", root));
                last_root = Some(root);
            }
        } else {
            last_root = None;
        }
        offered.push(name.clone());
    }

    for name in config.field_names() {
        if !name.is_empty() && !offered.iter().any(|o| o == name) {
            offered.push(name.to_string());
        }
    }

    offered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_keeps_field_order() {
        let config = GraphConfig::new(vec![Graph::new(
            "Gyros",
            vec![Field::new("gyroADC[0]", "#f00"), Field::new("gyroADC[1]", "#0f0"), Field::new("gyroADC[2]", "#00f")],
        )]);

        let expanded = config.expanded(0).unwrap();
        assert_eq!(expanded.len(), 3);
        let labels: Vec<&str> = expanded.graphs().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["gyroADC[0]", "gyroADC[1]", "gyroADC[2]"]);
        assert!(expanded.graphs().iter().all(|g| g.fields.len() == 1 && g.height == 1));
        assert!(config.expanded(1).is_none());
    }

    #[test]
    fn test_sanitized_drops_placeholders() {
        let mut graph = Graph::new("RC", vec![Field::new("rcCommand[0]", "#f00"), Field::new("", "#0f0")]);
        graph.height = 9;
        let config = GraphConfig::new(vec![graph]);

        let clean = config.sanitized();
        assert_eq!(clean.graphs()[0].fields.len(), 1);
        assert_eq!(clean.graphs()[0].height, MAX_GRAPH_HEIGHT);
    }

    #[test]
    fn test_serialized_shape() {
        let config = GraphConfig::new(vec![Graph::new(
            "Motors",
            vec![Field {
                smoothing: 3000,
                curve: Some(Curve::new(0.5, 1.0)),
                ..Field::new("motor[0]", "#f00")
            }],
        )]);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json[0]["label"], "Motors");
        assert_eq!(json[0]["fields"][0]["smoothing"], 3000);
        assert_eq!(json[0]["fields"][0]["curve"]["outputRange"], 1.0);
    }

    #[test]
    fn test_example_config() {
        let fields = names(&["time", "motor[0]", "motor[1]", "gyroADC[0]", "vbat"]);
        let config = GraphConfig::example(&fields, &["Motors", "Gyros"]);

        assert_eq!(config.len(), 2);
        assert_eq!(config.graphs()[0].fields.len(), 2);
        assert_eq!(config.graphs()[1].label, "Gyros");

        let fallback = GraphConfig::example(&names(&["time", "vbat"]), &["Motors"]);
        assert_eq!(fallback.graphs()[0].label, "vbat");
    }

    #[test]
    fn test_offered_field_names() {
        let fields = names(&["loopIteration", "time", "motor[0]", "motor[1]", "vbat"]);
        let config = GraphConfig::new(vec![Graph::new("Tail", vec![Field::new("servo[5]", "#fff")])]);

        let offered = offered_field_names(&fields, &config);
        assert_eq!(offered, ["motor[all]", "motor[0]", "motor[1]", "vbat", "servo[5]"]);
    }
}
