//! Static route descriptors and path matching.
//!
//! Paths are matched segment by segment. A pattern segment is either literal,
//! a `:name` parameter, or `*` (matches the remainder). Child paths are
//! relative to their parent. Route-level redirects are followed before any
//! guard runs.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("redirect loop while resolving '{path}' ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },

    #[error("duplicate route name '{0}'")]
    DuplicateName(String),
}

/// Reference to a page component, loaded on first use by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(Cow<'static, str>);

impl ComponentRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requirement flags attached to a route segment.
///
/// `requires_auth` is tri-state: `Some(true)` needs a principal, `Some(false)`
/// marks a guest-only page (login), `None` states no requirement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteMeta {
    pub requires_auth: Option<bool>,
    pub requires_admin: bool,
    pub requires_inspector: bool,
}

impl RouteMeta {
    pub const fn none() -> Self {
        Self {
            requires_auth: None,
            requires_admin: false,
            requires_inspector: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: Some(true),
            ..Self::none()
        }
    }

    pub const fn guest_only() -> Self {
        Self {
            requires_auth: Some(false),
            ..Self::none()
        }
    }

    pub const fn admin() -> Self {
        Self {
            requires_auth: Some(true),
            requires_admin: true,
            requires_inspector: false,
        }
    }

    pub const fn inspector() -> Self {
        Self {
            requires_auth: Some(true),
            requires_admin: false,
            requires_inspector: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub component: Option<ComponentRef>,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
    #[serde(default)]
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component: None,
            redirect: None,
            meta: RouteMeta::none(),
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component(mut self, component: impl Into<Cow<'static, str>>) -> Self {
        self.component = Some(ComponentRef::new(component));
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }

    fn pattern(&self) -> Vec<&str> {
        split_segments(&self.path)
    }
}

/// Union of the requirement flags of every matched segment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirements {
    pub requires_auth: bool,
    /// Some segment says `requires_auth: false` and none requires auth.
    pub guest_only: bool,
    pub requires_admin: bool,
    pub requires_inspector: bool,
}

impl Requirements {
    pub fn union<'a>(metas: impl IntoIterator<Item = &'a RouteMeta>) -> Self {
        let mut out = Self::default();
        let mut explicit_guest = false;

        for meta in metas {
            match meta.requires_auth {
                Some(true) => out.requires_auth = true,
                Some(false) => explicit_guest = true,
                None => {}
            }
            out.requires_admin |= meta.requires_admin;
            out.requires_inspector |= meta.requires_inspector;
        }

        out.guest_only = explicit_guest && !out.requires_auth;
        out
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Borrowed match result: the chain of descriptors from root to leaf.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub path: String,
    pub matched: Vec<&'a RouteDescriptor>,
    pub params: BTreeMap<String, String>,
}

impl<'a> RouteMatch<'a> {
    pub fn leaf(&self) -> Option<&'a RouteDescriptor> {
        self.matched.last().copied()
    }

    pub fn requirements(&self) -> Requirements {
        Requirements::union(self.matched.iter().map(|r| &r.meta))
    }
}

/// Owned result of resolving a destination, after route-level redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<ComponentRef>,
    pub params: BTreeMap<String, String>,
    pub requirements: Requirements,
    /// `false` when no descriptor matched; such destinations carry no flags.
    pub matched: bool,
    pub redirected_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    max_redirects: usize,
}

impl RouteTable {
    /// Build a table; route names must be unique across the whole tree.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&RouteDescriptor> = routes.iter().collect();
        while let Some(route) = stack.pop() {
            if let Some(name) = &route.name {
                if !seen.insert(name.as_str()) {
                    return Err(RouteError::DuplicateName(name.clone()));
                }
            }
            stack.extend(route.children.iter());
        }

        Ok(Self {
            routes,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Match `path` without following redirects.
    pub fn matches(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments = split_segments(strip_query(path));
        let mut chain = Vec::new();
        let mut params = BTreeMap::new();

        if match_in(&self.routes, &segments, &mut chain, &mut params) {
            Some(RouteMatch {
                path: join_segments(&segments),
                matched: chain,
                params,
            })
        } else {
            None
        }
    }

    /// Match `path`, following route-level redirects.
    pub fn resolve(&self, path: &str) -> Result<Resolution, RouteError> {
        let requested = normalize(path);
        let mut current = requested.clone();
        let mut hops = 0;

        loop {
            let Some(found) = self.matches(&current) else {
                return Ok(Resolution {
                    path: current,
                    name: None,
                    component: None,
                    params: BTreeMap::new(),
                    requirements: Requirements::default(),
                    matched: false,
                    redirected_from: (hops > 0).then(|| requested.clone()),
                });
            };

            if let Some(target) = found.leaf().and_then(|leaf| leaf.redirect.as_deref()) {
                hops += 1;
                if hops > self.max_redirects {
                    return Err(RouteError::RedirectLoop {
                        path: requested,
                        hops,
                    });
                }
                current = normalize(&absolute(target, &found.path));
                continue;
            }

            let leaf = found.leaf();
            return Ok(Resolution {
                name: leaf.and_then(|l| l.name.clone()),
                component: leaf.and_then(|l| l.component.clone()),
                requirements: found.requirements(),
                params: found.params,
                path: found.path,
                matched: true,
                redirected_from: (hops > 0).then_some(requested),
            });
        }
    }

    /// Full path pattern of the route called `name`.
    pub fn path_for(&self, name: &str) -> Option<String> {
        fn walk(routes: &[RouteDescriptor], prefix: &[String], name: &str) -> Option<String> {
            for route in routes {
                let mut full: Vec<String> = prefix.to_vec();
                full.extend(route.pattern().into_iter().map(str::to_string));
                if route.name.as_deref() == Some(name) {
                    return Some(format!("/{}", full.join("/")));
                }
                if let Some(found) = walk(&route.children, &full, name) {
                    return Some(found);
                }
            }
            None
        }

        walk(&self.routes, &[], name)
    }
}

fn match_in<'a>(
    routes: &'a [RouteDescriptor],
    segments: &[&str],
    chain: &mut Vec<&'a RouteDescriptor>,
    params: &mut BTreeMap<String, String>,
) -> bool {
    for route in routes {
        let snapshot = params.clone();
        let Some(rest) = consume(route, segments, params) else {
            *params = snapshot;
            continue;
        };

        chain.push(route);
        // An empty remainder may still select an empty-path child.
        if match_in(&route.children, rest, chain, params) || rest.is_empty() {
            return true;
        }
        chain.pop();
        *params = snapshot;
    }
    false
}

fn consume<'s>(
    route: &RouteDescriptor,
    segments: &'s [&'s str],
    params: &mut BTreeMap<String, String>,
) -> Option<&'s [&'s str]> {
    let pattern = route.pattern();

    for (idx, pat) in pattern.iter().enumerate() {
        if *pat == "*" {
            params.insert("pathMatch".to_string(), segments[idx.min(segments.len())..].join("/"));
            return Some(&segments[segments.len()..]);
        }
        let segment = segments.get(idx)?;
        match pat.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), segment.to_string());
            }
            None if pat == segment => {}
            None => return None,
        }
    }

    Some(&segments[pattern.len()..])
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join_segments(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// Canonical form: leading slash, no trailing slash, no query or fragment.
pub fn normalize(path: &str) -> String {
    join_segments(&split_segments(strip_query(path)))
}

fn absolute(target: &str, base: &str) -> String {
    if target.starts_with('/') {
        target.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), target)
    }
}
