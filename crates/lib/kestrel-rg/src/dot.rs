//! Graphviz dump of a graph's passes and resource dependencies. Purely a
//! diagnostic; nothing in the frame pipeline depends on its contents.

use std::io::{self, Write};

use crate::graph::RenderGraph;
use crate::node::tag_contributing_nodes;

impl RenderGraph {
    /// Write a `digraph` describing this graph: one table node per pass
    /// with one cell per used resource, and an edge from every written
    /// resource cell to each subsequent reader of that resource, up to
    /// the next write. Passes that would be pruned render greyed out
    /// with dashed in-edges; root passes are marked with `*`.
    pub fn write_dot(&self, frame_number: u64, writer: &mut dyn Write) -> io::Result<()> {
        let (mut nodes, unique_handles) = self.collect_nodes();
        tag_contributing_nodes(&mut nodes);

        writeln!(writer, "digraph g {{")?;
        writeln!(writer, "node [shape=plain, height=1];")?;
        writeln!(
            writer,
            "graph [label=\"rendergraph, frame {}\", labeljust=\"l\", nodesep=0.7, splines=true];",
            frame_number
        )?;

        for (pass, node) in self.passes.iter().zip(&nodes) {
            let bgcolor = if node.is_contributing {
                ""
            } else {
                " bgcolor='gray'"
            };
            let root_mark = if node.is_root { "* " } else { "" };

            write!(
                writer,
                "\"{}\" [label=<<table{} border='0' cellborder='1' cellspacing='0'><tr><td cellpadding='3'><b>{}{}</b></td>",
                pass.debug_name, bgcolor, root_mark, pass.debug_name
            )?;

            for handle in &pass.resources {
                let res_idx = unique_handles
                    .iter()
                    .position(|h| h == handle)
                    .expect("pass resource missing from unique handle table");

                write!(writer, "<td cellpadding='3' port=\"{}\">", handle.name())?;
                if node.reads.get(res_idx) {
                    write!(writer, "r ")?;
                }
                if node.writes.get(res_idx) {
                    write!(writer, "w <u>{}</u>", handle.name())?;
                } else {
                    write!(writer, "{}", handle.name())?;
                }
                write!(writer, "</td>")?;
            }

            writeln!(writer, "</tr></table>>];")?;
        }

        // A connection runs from each resource written in a pass to every
        // subsequent pass reading it, until the next write.
        for (i, pass) in self.passes.iter().enumerate() {
            for handle in &pass.resources {
                let res_idx = unique_handles
                    .iter()
                    .position(|h| h == handle)
                    .expect("pass resource missing from unique handle table");

                if !nodes[i].writes.get(res_idx) {
                    continue;
                }

                for k in (i + 1)..self.passes.len() {
                    if nodes[k].reads.get(res_idx) {
                        let style = if nodes[k].is_contributing {
                            ""
                        } else {
                            "[style=dashed]"
                        };
                        writeln!(
                            writer,
                            "\"{}\":\"{}\":s -> \"{}\":\"{}\":n{};",
                            pass.debug_name,
                            handle.name(),
                            self.passes[k].debug_name,
                            handle.name(),
                            style
                        )?;
                    }
                    if nodes[k].writes.get(res_idx) {
                        break;
                    }
                }
            }
        }

        writeln!(writer, "}}")
    }
}
