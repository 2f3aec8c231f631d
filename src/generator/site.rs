//! Built-in static HTML site generator
//!
//! Every Markdown file under the docs directory becomes one HTML page with the
//! site navigation rendered into it; every other file is copied unchanged.
//!
//! Output paths follow the usual static-site convention: `guide/setup.md`
//! becomes `guide/setup.html`, and `README.md` or `index.md` become the
//! directory's `index.html`. Relative links between Markdown files are
//! rewritten to point at the generated pages.
//!
//! Before anything is written the request is validated. Problems that make the
//! site unusable are collected and reported together as
//! `Error::ConfigInvalid`; smaller problems are returned as warnings in the
//! `SiteReport`, or promoted to errors when `strict` is set.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use rayon::prelude::*;
use walkdir::WalkDir;

use super::{SiteGenerator, SiteReport, SiteRequest};
use crate::config::SiteOptions;
use crate::defaults::{HOME_DOCUMENT, INDEX_DOCUMENT};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::navigation::{is_navigable_document, NavigationNode};
use crate::path::{is_markdown_file, label_for, relative_slash_path};

/// Renders Markdown to HTML pages with `pulldown-cmark`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSiteGenerator;

/// One entry of the navigation as the generator renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub title: String,
    /// Page path relative to the site root, or an absolute URL
    pub href: Option<String>,
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    fn from_nodes(nodes: &[NavigationNode]) -> Vec<NavEntry> {
        nodes
            .iter()
            .map(|node| match node {
                NavigationNode::Leaf { label, document } => NavEntry {
                    title: label.clone(),
                    href: Some(if is_external(document) {
                        document.clone()
                    } else {
                        page_path(document)
                    }),
                    children: Vec::new(),
                },
                NavigationNode::Branch { label, children } => NavEntry {
                    title: label.clone(),
                    href: None,
                    children: NavEntry::from_nodes(children),
                },
            })
            .collect()
    }
}

/// A Markdown source and the page it renders to
#[derive(Debug, Clone)]
struct Page {
    source: String,
    output: String,
}

/// Map extension names to parser options; unknown names are returned separately.
pub fn markdown_options(extensions: &[String]) -> (Options, Vec<String>) {
    let mut options = Options::empty();
    let mut unknown = Vec::new();
    for extension in extensions {
        match extension.as_str() {
            "tables" => options.insert(Options::ENABLE_TABLES),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            "smart-punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
            "heading-attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            other => unknown.push(other.to_string()),
        }
    }
    (options, unknown)
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

/// Output page for a Markdown document path (slash separated)
pub fn page_path(document: &str) -> String {
    let (directory, file) = match document.rsplit_once('/') {
        Some((directory, file)) => (Some(directory), file),
        None => (None, document),
    };

    let page = if file == HOME_DOCUMENT || file == INDEX_DOCUMENT {
        "index.html".to_string()
    } else {
        match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => format!("{}.html", stem),
            _ => format!("{}.html", file),
        }
    };

    match directory {
        Some(directory) => format!("{}/{}", directory, page),
        None => page,
    }
}

/// Rewrite a relative link to a Markdown document into a link to its page
pub fn rewrite_link(destination: &str) -> Option<String> {
    if is_external(destination) || destination.starts_with('/') || destination.starts_with('#') {
        return None;
    }

    let (target, fragment) = match destination.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment)),
        None => (destination, None),
    };
    if !is_markdown_file(Path::new(target)) {
        return None;
    }

    let mut rewritten = page_path(target);
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }
    Some(rewritten)
}

pub fn escape_html(text: &str) -> String {
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

fn is_hidden_entry(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Split the docs directory into Markdown sources and static assets
fn collect_sources(docs_dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut documents = Vec::new();
    let mut assets = Vec::new();
    for entry in WalkDir::new(docs_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden_entry(entry))
    {
        let entry = entry.map_err(|e| Error::SiteGeneration {
            message: format!("Failed to read '{}': {}", docs_dir.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_slash_path(entry.path(), docs_dir)?;
        if is_markdown_file(entry.path()) {
            documents.push(relative);
        } else {
            assets.push(relative);
        }
    }
    Ok((documents, assets))
}

fn nav_documents(nodes: &[NavigationNode]) -> Vec<&str> {
    nodes
        .iter()
        .flat_map(NavigationNode::documents)
        .filter(|document| !is_external(document))
        .collect()
}

/// Pair each source with its output page, resolving `index.md`/`README.md` clashes
fn plan_pages(documents: &[String], warnings: &mut Vec<String>) -> Vec<Page> {
    let mut by_output: BTreeMap<String, String> = BTreeMap::new();
    for source in documents {
        let output = page_path(source);
        match by_output.get(&output) {
            Some(existing) => {
                let (winner, skipped) = if source.ends_with(INDEX_DOCUMENT) {
                    (source.clone(), existing.clone())
                } else {
                    (existing.clone(), source.clone())
                };
                warnings.push(format!(
                    "Both '{}' and '{}' render to '{}'; skipping '{}'",
                    winner, skipped, output, skipped
                ));
                by_output.insert(output, winner);
            }
            None => {
                by_output.insert(output, source.clone());
            }
        }
    }
    by_output
        .into_iter()
        .map(|(output, source)| Page { source, output })
        .collect()
}

fn validate(
    request: &SiteRequest<'_>,
    documents: &[String],
    unknown_extensions: &[String],
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut errors: Vec<String> = unknown_extensions
        .iter()
        .map(|name| format!("Unknown markdown extension '{}'", name))
        .collect();

    if request.site_dir.starts_with(request.docs_dir) {
        errors.push(format!(
            "The site directory '{}' must not be inside the docs directory '{}'",
            request.site_dir.display(),
            request.docs_dir.display()
        ));
    }

    let known: BTreeSet<&str> = documents.iter().map(String::as_str).collect();
    let referenced = nav_documents(request.navigation);
    for document in &referenced {
        if !is_markdown_file(Path::new(document)) {
            errors.push(format!(
                "The navigation entry '{}' is not a Markdown document",
                document
            ));
        } else if !known.contains(document) {
            errors.push(format!(
                "A reference to '{}' is included in the navigation, which is not found in the documentation files",
                document
            ));
        }
    }

    // Other Markdown extensions are rendered but never discovered for navigation
    let referenced: BTreeSet<&str> = referenced.into_iter().collect();
    let unlisted: Vec<&str> = documents
        .iter()
        .map(String::as_str)
        .filter(|document| is_navigable_document(Path::new(document)))
        .filter(|document| !referenced.contains(document) && *document != INDEX_DOCUMENT)
        .collect();
    if !unlisted.is_empty() {
        warnings.push(format!(
            "The following pages exist in the docs directory, but are not included in the navigation:\n  - {}",
            unlisted.join("\n  - ")
        ));
    }

    errors
}

/// Text of the first level-one heading
fn first_heading(markdown: &str, options: Options) -> Option<String> {
    let mut in_heading = false;
    let mut title = String::new();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_heading = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_heading => break,
            Event::Text(text) | Event::Code(text) if in_heading => title.push_str(&text),
            _ => {}
        }
    }
    Some(title).filter(|title| !title.is_empty())
}

/// Render Markdown to an HTML fragment with document links rewritten
pub fn render_markdown(markdown: &str, options: Options) -> String {
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = rewrite_link(&dest_url)
                .map(CowStr::from)
                .unwrap_or(dest_url);
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        event => event,
    });

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);
    body
}

fn render_nav(entries: &[NavEntry], prefix: &str, current: &str, out: &mut String) {
    out.push_str("<ul>\n");
    for entry in entries {
        let title = escape_html(&entry.title);
        match &entry.href {
            Some(href) if is_external(href) => {
                out.push_str(&format!("<li><a href=\"{}\">{}</a></li>\n", escape_html(href), title));
            }
            Some(href) => {
                let class = if href == current { " class=\"active\"" } else { "" };
                out.push_str(&format!(
                    "<li{}><a href=\"{}{}\">{}</a></li>\n",
                    class,
                    prefix,
                    escape_html(href),
                    title
                ));
            }
            None => {
                out.push_str(&format!("<li><span>{}</span>\n", title));
                render_nav(&entry.children, prefix, current, out);
                out.push_str("</li>\n");
            }
        }
    }
    out.push_str("</ul>\n");
}

fn edit_link(options: &SiteOptions, source: &str) -> Option<String> {
    let repo_url = options.repo_url.as_deref()?;
    let edit_uri = options.edit_uri.as_deref()?;
    if is_external(edit_uri) {
        return Some(format!("{}/{}", edit_uri.trim_end_matches('/'), source));
    }
    let edit_uri = edit_uri.trim_matches('/');
    Some(format!("{}/{}/{}", repo_url.trim_end_matches('/'), edit_uri, source))
}

struct PageContext<'a> {
    request: &'a SiteRequest<'a>,
    nav: &'a [NavEntry],
    titles: &'a BTreeMap<String, String>,
    options: Options,
}

fn render_page(context: &PageContext<'_>, page: &Page) -> Result<PathBuf> {
    let source_path = context.request.docs_dir.join(&page.source);
    let markdown = fs::read_to_string(&source_path).map_err(|e| Error::SiteGeneration {
        message: format!("Failed to read '{}': {}", source_path.display(), e),
    })?;

    let title = context
        .titles
        .get(&page.output)
        .cloned()
        .or_else(|| first_heading(&markdown, context.options))
        .unwrap_or_else(|| label_for(Path::new(&page.source), &BTreeMap::new()));

    let site_name = context.request.options.site_name.as_deref().unwrap_or_default();
    let prefix = "../".repeat(page.output.matches('/').count());

    let mut nav = String::new();
    render_nav(context.nav, &prefix, &page.output, &mut nav);

    let mut main = render_markdown(&markdown, context.options);
    if let Some(link) = edit_link(context.request.options, &page.source) {
        main.push_str(&format!(
            "<p class=\"edit-link\"><a href=\"{}\">Edit this page</a></p>\n",
            escape_html(&link)
        ));
    }

    let document = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<nav class=\"site-nav\">\n{}</nav>\n<main>\n{}</main>\n</body>\n</html>\n",
        if site_name.is_empty() {
            escape_html(&title)
        } else {
            format!("{} - {}", escape_html(&title), escape_html(site_name))
        },
        nav,
        main
    );

    let output_path = context.request.site_dir.join(&page.output);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, document).map_err(|e| Error::SiteGeneration {
        message: format!("Failed to write '{}': {}", output_path.display(), e),
    })?;

    Ok(PathBuf::from(&page.output))
}

fn collect_titles(entries: &[NavEntry], titles: &mut BTreeMap<String, String>) {
    for entry in entries {
        if let Some(href) = &entry.href {
            titles.entry(href.clone()).or_insert_with(|| entry.title.clone());
        }
        collect_titles(&entry.children, titles);
    }
}

impl SiteGenerator for HtmlSiteGenerator {
    fn generate(&self, request: &SiteRequest<'_>) -> Result<SiteReport> {
        if !request.docs_dir.is_dir() {
            return Err(Error::ConfigInvalid {
                message: "Aborted with 1 configuration errors".to_string(),
                errors: vec![format!(
                    "The docs directory '{}' isn't an existing directory",
                    request.docs_dir.display()
                )],
            });
        }

        let extensions = request.options.markdown_extensions.clone().unwrap_or_default();
        let (options, unknown_extensions) = markdown_options(&extensions);

        let (documents, assets) = collect_sources(request.docs_dir)?;
        let mut warnings = Vec::new();
        let pages = plan_pages(&documents, &mut warnings);
        let mut errors = validate(request, &documents, &unknown_extensions, &mut warnings);

        if request.options.is_strict() {
            errors.append(&mut warnings);
        }
        if !errors.is_empty() {
            return Err(Error::ConfigInvalid {
                message: format!("Aborted with {} configuration errors", errors.len()),
                errors,
            });
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        fs::create_dir_all(request.site_dir).map_err(|e| Error::SiteGeneration {
            message: format!("Failed to create '{}': {}", request.site_dir.display(), e),
        })?;

        let nav = NavEntry::from_nodes(request.navigation);
        let mut titles = BTreeMap::new();
        collect_titles(&nav, &mut titles);

        if !request.options.extra.is_empty() {
            debug!(
                "Ignoring site options without built-in meaning: {:?}",
                request.options.extra.keys().collect::<Vec<_>>()
            );
        }

        let context = PageContext {
            request,
            nav: &nav,
            titles: &titles,
            options,
        };
        let rendered = pages
            .par_iter()
            .map(|page| render_page(&context, page))
            .collect::<Result<Vec<_>>>()?;

        let mut copied = Vec::with_capacity(assets.len());
        for asset in &assets {
            filesystem::copy_file(&request.docs_dir.join(asset), &request.site_dir.join(asset))?;
            copied.push(PathBuf::from(asset));
        }

        info!(
            "Built {} pages and copied {} assets into '{}'",
            rendered.len(),
            copied.len(),
            request.site_dir.display()
        );

        Ok(SiteReport {
            pages: rendered,
            assets: copied,
            warnings,
        })
    }
}
