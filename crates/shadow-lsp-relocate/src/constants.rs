//! Compiled-in names of the LSP and DAP libraries.

/// Module group the LSP and DAP libraries are published under. Archives are
/// expected to contain these modules already merged; nothing filters by group.
pub const LSP_MODULE_GROUP: &str = "dev.j-a.ide";

/// Package which contains all classes of the LSP and DAP libraries.
pub const LSP_PACKAGE_PREFIX: &str = "dev.j_a.ide";

/// Classifier of the relocated archive unless configured otherwise.
pub const DEFAULT_ARCHIVE_CLASSIFIER: &str = "shadowed";

/// Token in snippet templates replaced by each enabled language ID.
pub const LANGUAGE_ID_PLACEHOLDER: &str = "$LANGUAGE_ID$";

/// Expanded snippets are spliced in front of the first occurrence of this tag.
pub const CLOSING_PLUGIN_TAG: &str = "</idea-plugin>";

/// Indent applied to every expanded snippet line.
pub const SNIPPET_INDENT: &str = "    ";

/// A main descriptor and the snippet template merged into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorRoute {
    pub main:    &'static str,
    pub snippet: &'static str,
}

pub const DESCRIPTOR_ROUTES: [DescriptorRoute; 2] = [
    DescriptorRoute {
        main:    "META-INF/plugin-lsp-client.xml",
        snippet: "META-INF/plugin-lsp-client-snippets.xml",
    },
    DescriptorRoute {
        main:    "META-INF/plugin-dap-client.xml",
        snippet: "META-INF/plugin-dap-client-snippets.xml",
    },
];

pub fn is_main_descriptor(path: &str) -> bool {
    DESCRIPTOR_ROUTES.iter().any(|route| route.main == path)
}

pub fn is_snippet_descriptor(path: &str) -> bool {
    DESCRIPTOR_ROUTES.iter().any(|route| route.snippet == path)
}

pub fn snippet_for(main: &str) -> Option<&'static str> {
    DESCRIPTOR_ROUTES
        .iter()
        .find(|route| route.main == main)
        .map(|route| route.snippet)
}
