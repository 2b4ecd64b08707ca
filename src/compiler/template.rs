//! Default precache compiler rendering a self-contained worker from a source template.

use regex::Regex;
use serde::Serialize;

use super::handlers::resolve_handler;
use super::{CompileRequest, CompiledWorker, PrecacheCompiler};
use crate::config::RuntimeCachingRule;
use crate::error::CompileError;

const DEFAULT_CACHE_PREFIX: &str = "precache";
const DEFAULT_IGNORED_PARAMETERS: [&str; 1] = ["^utm_"];

/// Renders a dependency-free precaching service worker.
///
/// The generated worker precaches every manifest entry on install, keyed by revision, serves
/// precached requests cache-first, applies the configured runtime caching rules to everything
/// else and removes outdated precaches on activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePrecacheCompiler;

#[derive(Serialize)]
struct ManifestRecord<'a> {
  url: &'a str,
  revision: &'a str,
}

impl PrecacheCompiler for TemplatePrecacheCompiler {
  fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledWorker, CompileError> {
    let options = request.options;
    if let Some(option) = options.unsupported_option() {
      return Err(CompileError::UnsupportedOption(option));
    }

    let mut diagnostics = Vec::new();
    let runtime_rules = options
      .runtime_caching
      .iter()
      .map(|rule| render_runtime_rule(rule, &mut diagnostics))
      .collect::<Result<Vec<_>, _>>()?;

    let ignored_parameters = if options.ignore_url_parameters_matching.is_empty() {
      DEFAULT_IGNORED_PARAMETERS
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
    } else {
      options.ignore_url_parameters_matching.clone()
    };
    let ignored_parameters = ignored_parameters
      .iter()
      .map(|pattern| render_regexp(pattern))
      .collect::<Result<Vec<_>, _>>()?;

    let records: Vec<ManifestRecord<'_>> = request
      .entries
      .iter()
      .map(|entry| ManifestRecord {
        url: &entry.url,
        revision: &entry.revision,
      })
      .collect();
    let manifest = serde_json::to_string_pretty(&records)
      .map_err(|err| CompileError::Generation(err.to_string()))?;

    let cache_prefix = options.cache_id.as_deref().unwrap_or(DEFAULT_CACHE_PREFIX);
    let manifest_digest = md5::compute(
      request
        .entries
        .iter()
        .map(|entry| format!("{} {}\n", entry.url, entry.revision))
        .collect::<String>(),
    );

    let source = format!(
      r#"// Precache service worker for {target}, generated at build time.
'use strict';

const CACHE_PREFIX = {cache_prefix};
const CACHE_NAME = CACHE_PREFIX + '-' + {cache_version};
const RUNTIME_CACHE_NAME = CACHE_PREFIX + '-runtime';
const PRECACHE_MANIFEST = {manifest};
const RUNTIME_CACHING = [
{runtime_rules}
];
const NAVIGATE_FALLBACK = {navigate_fallback};
const DIRECTORY_INDEX = {directory_index};
const IGNORE_URL_PARAMETERS_MATCHING = [{ignored_parameters}];

function precacheKey(entry) {{
  const url = new URL(entry.url, self.location);
  url.searchParams.set('__precache_revision', entry.revision);
  return url.href;
}}

function normaliseRequestUrl(requestUrl) {{
  const url = new URL(requestUrl);
  url.hash = '';
  for (const key of Array.from(url.searchParams.keys())) {{
    if (IGNORE_URL_PARAMETERS_MATCHING.some((pattern) => pattern.test(key))) {{
      url.searchParams.delete(key);
    }}
  }}
  if (DIRECTORY_INDEX && url.pathname.endsWith('/')) {{
    url.pathname += DIRECTORY_INDEX;
  }}
  return url.href;
}}

const PRECACHED = new Map(
  PRECACHE_MANIFEST.map((entry) => [new URL(entry.url, self.location).href, precacheKey(entry)])
);

function fromNetwork(request, cacheName) {{
  return fetch(request).then((response) => {{
    if (response && response.ok && cacheName) {{
      const copy = response.clone();
      caches.open(cacheName).then((cache) => cache.put(request, copy));
    }}
    return response;
  }});
}}

function withTimeout(promise, seconds) {{
  if (!seconds) {{
    return promise;
  }}
  return Promise.race([
    promise,
    new Promise((resolve, reject) => setTimeout(() => reject(new Error('timeout')), seconds * 1000)),
  ]);
}}

const STRATEGIES = {{
  CacheFirst: (request, cacheName) =>
    caches.match(request, {{ cacheName }}).then((cached) => cached || fromNetwork(request, cacheName)),
  CacheOnly: (request, cacheName) => caches.match(request, {{ cacheName }}),
  NetworkFirst: (request, cacheName, timeout) =>
    withTimeout(fromNetwork(request, cacheName), timeout).catch(() => caches.match(request, {{ cacheName }})),
  NetworkOnly: (request) => fetch(request),
  StaleWhileRevalidate: (request, cacheName) =>
    caches.match(request, {{ cacheName }}).then((cached) => {{
      const refreshed = fromNetwork(request, cacheName);
      return cached || refreshed;
    }}),
}};

self.addEventListener('install', (event) => {{
  event.waitUntil(
    caches.open(CACHE_NAME)
      .then((cache) => cache.addAll(Array.from(PRECACHED.values())))
      .then(() => {skip_waiting})
  );
}});

self.addEventListener('activate', (event) => {{
  event.waitUntil(
    caches.keys()
      .then((names) => Promise.all(
        names
          .filter((name) => name.startsWith(CACHE_PREFIX + '-') && name !== CACHE_NAME && name !== RUNTIME_CACHE_NAME)
          .map((name) => caches.delete(name))
      ))
      .then(() => {clients_claim})
  );
}});

self.addEventListener('fetch', (event) => {{
  if (event.request.method !== 'GET') {{
    return;
  }}

  let key = PRECACHED.get(normaliseRequestUrl(event.request.url));
  if (!key && NAVIGATE_FALLBACK && event.request.mode === 'navigate') {{
    key = PRECACHED.get(new URL(NAVIGATE_FALLBACK, self.location).href);
  }}
  if (key) {{
    event.respondWith(
      caches.open(CACHE_NAME)
        .then((cache) => cache.match(key))
        .then((cached) => cached || fetch(event.request))
    );
    return;
  }}

  const rule = RUNTIME_CACHING.find((candidate) => candidate.urlPattern.test(event.request.url));
  if (rule) {{
    const strategy = STRATEGIES[rule.handler];
    event.respondWith(strategy(event.request, rule.cacheName || RUNTIME_CACHE_NAME, rule.networkTimeoutSeconds));
  }}
}});
"#,
      target = request.target_url,
      cache_prefix = json_string(cache_prefix),
      cache_version = json_string(&format!("{manifest_digest:x}")),
      runtime_rules = runtime_rules.join(",\n"),
      navigate_fallback = json_optional(options.navigate_fallback.as_deref()),
      directory_index = json_optional(Some(
        options.directory_index.as_deref().unwrap_or("index.html")
      )),
      ignored_parameters = ignored_parameters.join(", "),
      skip_waiting = if options.skip_waiting {
        "self.skipWaiting()"
      } else {
        "undefined"
      },
      clients_claim = if options.clients_claim {
        "self.clients.claim()"
      } else {
        "undefined"
      },
    );

    Ok(CompiledWorker {
      source,
      diagnostics,
    })
  }
}

fn render_runtime_rule(
  rule: &RuntimeCachingRule,
  diagnostics: &mut Vec<String>,
) -> Result<String, CompileError> {
  let (handler, deprecation) = resolve_handler(&rule.handler)?;
  diagnostics.extend(deprecation);

  let cache_name = rule
    .options
    .as_ref()
    .and_then(|options| options.cache_name.as_deref());
  let timeout = rule
    .options
    .as_ref()
    .and_then(|options| options.network_timeout_seconds)
    .map_or_else(|| "null".to_string(), |seconds| seconds.to_string());

  Ok(format!(
    "  {{ urlPattern: {pattern}, handler: {handler}, cacheName: {cache_name}, networkTimeoutSeconds: {timeout} }}",
    pattern = render_regexp(&rule.url_pattern)?,
    handler = json_string(handler.name()),
    cache_name = json_optional(cache_name),
  ))
}

/// Render a `new RegExp(...)` expression after checking the pattern compiles.
fn render_regexp(pattern: &str) -> Result<String, CompileError> {
  Regex::new(pattern).map_err(|source| CompileError::InvalidUrlPattern {
    pattern: pattern.to_string(),
    source,
  })?;
  Ok(format!("new RegExp({})", json_string(pattern)))
}

fn json_string(value: &str) -> String {
  serde_json::Value::from(value).to_string()
}

fn json_optional(value: Option<&str>) -> String {
  value.map_or_else(|| "null".to_string(), json_string)
}
