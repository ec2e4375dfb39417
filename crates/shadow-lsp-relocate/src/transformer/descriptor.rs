use std::collections::HashMap;

use tracing::debug;

use super::snippet::{expand_snippet, splice_before_closing_tag};
use super::{TransformedResources, TransformerContext};
use crate::archive::EntrySink;
use crate::constants::{is_main_descriptor, is_snippet_descriptor, snippet_for};
use crate::error::Result;

/// Updates the LSP and DAP library descriptors with the relocated classes.
///
/// Additionally merges the snippet of optional, language-dependent features
/// into the main descriptor, once per enabled language ID.
pub struct DescriptorTransformer {
    language_ids: Vec<String>,
    resources:    TransformedResources,
}

impl DescriptorTransformer {
    pub fn new<I, S>(language_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            language_ids: language_ids.into_iter().map(Into::into).collect(),
            resources:    TransformedResources::new(),
        }
    }

    pub fn can_transform_resource(&self, path: &str) -> bool {
        is_main_descriptor(path) || is_snippet_descriptor(path)
    }

    pub fn transform(&mut self, context: TransformerContext<'_>) -> Result<()> {
        let path = context.path.to_string();
        let patched = context.into_relocated_text()?;
        self.resources.insert(path, patched);
        Ok(())
    }

    pub fn has_transformed_resource(&self) -> bool {
        !self.resources.is_empty()
    }

    pub fn modify_output(&self, sink: &mut dyn EntrySink) -> Result<()> {
        let expanded: HashMap<&str, String> = self
            .resources
            .iter()
            .filter(|(path, _)| is_snippet_descriptor(path))
            .map(|(path, xml)| (path, expand_snippet(xml, &self.language_ids)))
            .collect();

        for (path, xml) in self.resources.iter() {
            if !is_main_descriptor(path) {
                sink.put_entry(path, xml.as_bytes())?;
                continue;
            }

            let snippet = snippet_for(path).and_then(|snippet_path| expanded.get(snippet_path));
            debug!(path, snippet = ?snippet, "LSP snippet XML");

            match snippet {
                Some(block) => {
                    let patched = splice_before_closing_tag(xml, block);
                    debug!(path, unpatched = xml, patched = %patched, "patched LSP descriptor");
                    sink.put_entry(path, patched.as_bytes())?;
                }
                None => sink.put_entry(path, xml.as_bytes())?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::tests::{CollectSink, relocators};

    const LSP_MAIN: &str = "META-INF/plugin-lsp-client.xml";
    const LSP_SNIPPET: &str = "META-INF/plugin-lsp-client-snippets.xml";
    const DAP_MAIN: &str = "META-INF/plugin-dap-client.xml";

    fn feed(transformer: &mut DescriptorTransformer, path: &str, xml: &str) {
        let relocators = relocators();
        transformer
            .transform(TransformerContext {
                path,
                content: xml.as_bytes().to_vec(),
                relocators: &relocators,
            })
            .unwrap();
    }

    fn output(transformer: &DescriptorTransformer) -> CollectSink {
        let mut sink = CollectSink::default();
        transformer.modify_output(&mut sink).unwrap();
        sink
    }

    #[test]
    fn test_claims_only_routed_paths() {
        let transformer = DescriptorTransformer::new(["rust"]);
        assert!(transformer.can_transform_resource(LSP_MAIN));
        assert!(transformer.can_transform_resource(LSP_SNIPPET));
        assert!(transformer.can_transform_resource(DAP_MAIN));
        assert!(transformer.can_transform_resource("META-INF/plugin-dap-client-snippets.xml"));
        assert!(!transformer.can_transform_resource("META-INF/plugin.xml"));
        assert!(!transformer.can_transform_resource("meta-inf/plugin-lsp-client.xml"));
    }

    #[test]
    fn test_merges_snippet_into_main_descriptor() {
        let mut transformer = DescriptorTransformer::new(["rust"]);
        feed(&mut transformer, LSP_MAIN, "<idea-plugin>X</idea-plugin>");
        feed(&mut transformer, LSP_SNIPPET, r#"<ext id="$LANGUAGE_ID$"/>"#);

        let sink = output(&transformer);
        assert_eq!(
            sink.get(LSP_MAIN),
            Some("<idea-plugin>X\n    <ext id=\"rust\"/>\n\n</idea-plugin>")
        );
        assert_eq!(sink.get(LSP_SNIPPET), Some(r#"<ext id="$LANGUAGE_ID$"/>"#));
    }

    #[test]
    fn test_snippet_may_arrive_before_main() {
        let mut transformer = DescriptorTransformer::new(["python", "go"]);
        feed(&mut transformer, LSP_SNIPPET, r#"<ext id="$LANGUAGE_ID$"/>"#);
        feed(&mut transformer, LSP_MAIN, "<idea-plugin>\n</idea-plugin>");

        let sink = output(&transformer);
        assert_eq!(
            sink.get(LSP_MAIN),
            Some("<idea-plugin>\n    <ext id=\"python\"/>\n    <ext id=\"go\"/>\n\n</idea-plugin>")
        );
        assert_eq!(sink.entries[0].0, LSP_SNIPPET);
        assert_eq!(sink.entries[1].0, LSP_MAIN);
    }

    #[test]
    fn test_relocates_descriptor_and_snippet_text() {
        let mut transformer = DescriptorTransformer::new(["rust"]);
        feed(
            &mut transformer,
            LSP_MAIN,
            r#"<idea-plugin><service impl="dev.j_a.ide.lsp.Service"/></idea-plugin>"#,
        );
        feed(
            &mut transformer,
            LSP_SNIPPET,
            r#"<ext language="$LANGUAGE_ID$" impl="dev.j_a.ide.lsp.Ext"/>"#,
        );

        let sink = output(&transformer);
        assert_eq!(
            sink.get(LSP_MAIN),
            Some(concat!(
                r#"<idea-plugin><service impl="com.example.lsp.lsp.Service"/>"#,
                "\n",
                r#"    <ext language="rust" impl="com.example.lsp.lsp.Ext"/>"#,
                "\n\n</idea-plugin>"
            ))
        );
        assert_eq!(
            sink.get(LSP_SNIPPET),
            Some(r#"<ext language="$LANGUAGE_ID$" impl="com.example.lsp.lsp.Ext"/>"#)
        );
    }

    #[test]
    fn test_main_without_snippet_is_unchanged() {
        let mut transformer = DescriptorTransformer::new(["rust"]);
        feed(&mut transformer, DAP_MAIN, "  <idea-plugin>X</idea-plugin>\n");

        let sink = output(&transformer);
        assert_eq!(sink.get(DAP_MAIN), Some("  <idea-plugin>X</idea-plugin>\n"));
        assert_eq!(sink.entries.len(), 1);
    }

    #[test]
    fn test_snippet_of_other_route_is_not_merged() {
        let mut transformer = DescriptorTransformer::new(["rust"]);
        feed(&mut transformer, DAP_MAIN, "<idea-plugin>X</idea-plugin>");
        feed(&mut transformer, LSP_SNIPPET, "<ext/>");

        let sink = output(&transformer);
        assert_eq!(sink.get(DAP_MAIN), Some("<idea-plugin>X</idea-plugin>"));
        assert_eq!(sink.get(LSP_SNIPPET), Some("<ext/>"));
    }

    #[test]
    fn test_empty_language_ids_still_splice_empty_block() {
        let mut transformer = DescriptorTransformer::new(Vec::<String>::new());
        feed(&mut transformer, LSP_MAIN, "<idea-plugin>X</idea-plugin>");
        feed(&mut transformer, LSP_SNIPPET, r#"<ext id="$LANGUAGE_ID$"/>"#);

        let sink = output(&transformer);
        assert_eq!(sink.get(LSP_MAIN), Some("<idea-plugin>X\n</idea-plugin>"));
        assert_eq!(sink.get(LSP_SNIPPET), Some(r#"<ext id="$LANGUAGE_ID$"/>"#));
    }

    #[test]
    fn test_second_visit_of_path_wins() {
        let mut transformer = DescriptorTransformer::new(Vec::<String>::new());
        feed(&mut transformer, DAP_MAIN, "<first/>");
        feed(&mut transformer, DAP_MAIN, "<second/>");

        let sink = output(&transformer);
        assert_eq!(sink.entries, vec![(DAP_MAIN.to_string(), "<second/>".to_string())]);
    }

    #[test]
    fn test_instances_do_not_share_buffers() {
        let mut first = DescriptorTransformer::new(["rust"]);
        let second = DescriptorTransformer::new(["rust"]);
        feed(&mut first, DAP_MAIN, "<idea-plugin/>");

        assert!(first.has_transformed_resource());
        assert!(!second.has_transformed_resource());
    }
}
