//! Standalone interactive HTML page around the SVG heat map.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Error;
use crate::plot::{Cell, Geometry, PlotSpec};

#[derive(Serialize)]
struct CellRecord<'a> {
    #[serde(flatten)]
    cell: &'a Cell,
    x: i32,
    y: i32,
    size: i32,
}

#[derive(Serialize)]
struct DataIsland<'a> {
    title: Option<&'a str>,
    colorbar_title: &'a str,
    colormap: &'a str,
    cells: Vec<CellRecord<'a>>,
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 24px; color: #222; }
#elemap-figure { position: relative; display: inline-block; }
#elemap-figure svg { max-width: 100%; height: auto; }
#elemap-tooltip {
  position: absolute; display: none; pointer-events: none;
  background: rgba(255, 255, 255, 0.95); border: 1px solid #444;
  border-radius: 4px; padding: 4px 8px; font-size: 13px; white-space: nowrap;
}
table { border-collapse: collapse; margin-top: 24px; }
th, td { border: 1px solid #ccc; padding: 2px 10px; text-align: right; }
th { background: #eee; }
td:nth-child(2), td:nth-child(3) { text-align: left; }
"#;

const SCRIPT: &str = r#"
(function () {
  const data = JSON.parse(document.getElementById("elemap-data").textContent);
  const figure = document.getElementById("elemap-figure");
  const svg = figure.querySelector("svg");
  const tooltip = document.getElementById("elemap-tooltip");
  const width = svg.width.baseVal.value;

  svg.addEventListener("mousemove", function (event) {
    const box = svg.getBoundingClientRect();
    const scale = width / box.width;
    const x = (event.clientX - box.left) * scale;
    const y = (event.clientY - box.top) * scale;
    const cell = data.cells.find(function (c) {
      return x >= c.x && x < c.x + c.size && y >= c.y && y < c.y + c.size;
    });
    if (!cell) {
      tooltip.style.display = "none";
      return;
    }
    let value = "no data";
    if (cell.excluded) {
      value = "excluded";
    } else if (cell.value !== null) {
      value = cell.label !== null ? cell.label : String(cell.value);
    }
    tooltip.textContent = cell.name + " (" + cell.symbol + ", Z=" + cell.z + "): " +
      data.colorbar_title + " = " + value;
    tooltip.style.left = (event.clientX - figure.getBoundingClientRect().left + 12) + "px";
    tooltip.style.top = (event.clientY - figure.getBoundingClientRect().top + 12) + "px";
    tooltip.style.display = "block";
  });
  svg.addEventListener("mouseleave", function () {
    tooltip.style.display = "none";
  });
})();
"#;

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn data_island(spec: &PlotSpec, cells: &[Cell]) -> Result<String, Error> {
    let geometry = Geometry::new(1.0);
    let island = DataIsland {
        title: spec.title.as_deref(),
        colorbar_title: &spec.colorbar_title,
        colormap: spec.colormap.name(),
        cells: cells
            .iter()
            .map(|cell| {
                let (x, y) = geometry.cell_origin(cell.row, cell.column);
                CellRecord {
                    cell,
                    x,
                    y,
                    size: geometry.cell_size(),
                }
            })
            .collect(),
    };
    // keep `</script>` inside strings from closing the data block
    Ok(serde_json::to_string(&island)?.replace("</", "<\\/"))
}

/// HTML page embedding `svg`, a hover tooltip and a table of the values.
pub fn document(spec: &PlotSpec, svg: &str) -> Result<String, Error> {
    let cells = spec.cells();
    let title = escape(spec.title.as_deref().unwrap_or("Periodic table"));
    let column = escape(&spec.colorbar_title);

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div id=\"elemap-figure\">\n{svg}\n<div id=\"elemap-tooltip\"></div>\n</div>\n"
    );

    let _ = write!(
        html,
        "<table id=\"elemap-table\">\n<thead><tr><th>Z</th><th>Element</th><th>Name</th>\
         <th>{column}</th></tr></thead>\n<tbody>\n"
    );
    for cell in cells.iter().filter(|c| c.value.is_some()) {
        let value = cell
            .value
            .map(|v| spec.format_value(v))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{value}</td></tr>",
            cell.z, cell.symbol, cell.name
        );
    }
    html.push_str("</tbody>\n</table>\n");

    let _ = write!(
        html,
        "<script type=\"application/json\" id=\"elemap-data\">{}</script>\n\
         <script>{SCRIPT}</script>\n</body>\n</html>\n",
        data_island(spec, &cells)?
    );
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::tests::spec;

    #[test]
    fn escaping() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn page_contents() {
        let mut spec = spec(true);
        spec.title = Some("Counts </script> & more".to_string());
        let html = document(&spec, "<svg></svg>").unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Counts &lt;/script&gt; &amp; more</title>"));
        assert!(html.contains("<svg></svg>"));
        assert!(html.contains("<tr><td>26</td><td>Fe</td><td>Iron</td><td>1</td></tr>"));
        // only elements with data are listed
        assert_eq!(html.matches("<tr><td>").count(), 3);
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn data_island_json() {
        let spec = spec(false);
        let cells = spec.cells();
        let json: serde_json::Value = serde_json::from_str(&data_island(&spec, &cells).unwrap()).unwrap();

        assert_eq!(json["colorbar_title"], "Count");
        assert_eq!(json["colormap"], "Greys");
        let cells = json["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 118);
        assert_eq!(cells[0]["symbol"], "H");
        assert_eq!(cells[0]["value"], 10.0);
        assert_eq!(cells[0]["fill"], "#000000");
        assert_eq!(cells[0]["x"], 24);
        assert_eq!(cells[0]["y"], 56);
        assert_eq!(cells[5]["excluded"], true);
        assert!(cells[1]["value"].is_null());
    }
}
