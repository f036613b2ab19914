#![forbid(unsafe_code)]

//! The update-cycle orchestrator.
//!
//! # Design
//!
//! [`App`] owns the host document, the store, and both callback tables.
//! Every committed write runs one full synchronous cycle: recompile the
//! template against the current snapshot, parse the result into a shadow
//! document, reconcile it into the live tree, re-run the visibility pass,
//! and rebuild both binding tables. The watch entry for the written key
//! fires after the cycle completes.
//!
//! # Re-entrancy
//!
//! A watch, method, or hook that writes again nests a complete inner cycle
//! before the outer call returns (stack discipline, not a queue). Later
//! effects observe intermediate renders. N writes always mean N full
//! cycles; there is no coalescing and no scheduler.
//!
//! # Failure modes
//!
//! Only mounting can fail. Inside a cycle every failure is scoped to one
//! expression or binding and logged; the cycle itself always completes.

use std::rc::Rc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, warn};

use tether_dom::{Document, EventKind, NodeId, parse_fragment, parse_into};
use tether_template::compile;

use crate::context::AppContext;
use crate::error::ConfigError;
use crate::forms::{self, Bindings, EventBinding, coerce_to_existing};
use crate::reconcile::{PatchStats, reconcile};
use crate::store::{Store, WriteOutcome};
use crate::tables::{HookFn, IntoWatch, MethodTable, NameRef, WatchTable};
use crate::visibility;

/// Whether a cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Updating,
}

/// Construction options for [`App::mount`].
pub struct AppOptions {
    data: Value,
    el: Option<String>,
    methods: MethodTable,
    watches: WatchTable,
    before_mount: Option<HookFn>,
    mounted: Option<HookFn>,
    after_update: Option<HookFn>,
    dev: bool,
    strict: bool,
}

impl AppOptions {
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            data,
            el: None,
            methods: MethodTable::default(),
            watches: WatchTable::default(),
            before_mount: None,
            mounted: None,
            after_update: None,
            dev: false,
            strict: false,
        }
    }

    /// Mount selector: `#id`, `.class`, or a bare id.
    #[must_use]
    pub fn el(mut self, selector: impl Into<String>) -> Self {
        self.el = Some(selector.into());
        self
    }

    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&mut App, &[String]) + 'static,
    ) -> Self {
        self.methods.insert(name, Rc::new(method));
        self
    }

    #[must_use]
    pub fn watch(mut self, name: impl Into<String>, watch: impl IntoWatch) -> Self {
        self.watches.insert(name, watch.into_watch());
        self
    }

    /// Runs before the template is captured; may still mutate the host
    /// document.
    #[must_use]
    pub fn before_mount(mut self, hook: impl Fn(&mut App) + 'static) -> Self {
        self.before_mount = Some(Rc::new(hook));
        self
    }

    /// Runs once, after the first render.
    #[must_use]
    pub fn mounted(mut self, hook: impl Fn(&mut App) + 'static) -> Self {
        self.mounted = Some(Rc::new(hook));
        self
    }

    /// Runs at the end of every update cycle, nested cycles included.
    #[must_use]
    pub fn after_update(mut self, hook: impl Fn(&mut App) + 'static) -> Self {
        self.after_update = Some(Rc::new(hook));
        self
    }

    /// Log render timings and patch stats.
    #[must_use]
    pub fn dev(mut self, on: bool) -> Self {
        self.dev = on;
        self
    }

    /// Warn at bind time about event bindings with no matching method.
    #[must_use]
    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }
}

pub struct App {
    doc: Document,
    mount: NodeId,
    template: String,
    store: Store,
    methods: MethodTable,
    watches: WatchTable,
    after_update: Option<HookFn>,
    ctx: AppContext,
    bindings: Bindings,
    last_patch: PatchStats,
    depth: usize,
}

impl App {
    /// Mount into `doc` at the options' selector. The mount element's inner
    /// markup (after the `before_mount` hook has run) becomes the immutable
    /// template.
    pub fn mount(doc: Document, options: AppOptions) -> Result<Self, ConfigError> {
        let AppOptions {
            data,
            el,
            methods,
            watches,
            before_mount,
            mounted,
            after_update,
            dev,
            strict,
        } = options;

        let store = Store::new(data)?;
        let selector = el.ok_or(ConfigError::MissingMountSelector)?;
        let mount = doc
            .query_selector(&selector)
            .ok_or_else(|| ConfigError::mount_not_found(&selector))?;

        let mut app = Self {
            doc,
            mount,
            template: String::new(),
            store,
            methods,
            watches,
            after_update,
            ctx: AppContext::new(mount, dev, strict),
            bindings: Bindings::default(),
            last_patch: PatchStats::default(),
            depth: 0,
        };

        if let Some(hook) = before_mount {
            hook(&mut app);
        }
        app.template = app.doc.inner_markup(app.mount);
        validate_markers(&app.template)?;
        app.render_initial()?;
        if let Some(hook) = mounted {
            hook(&mut app);
        }
        Ok(app)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable host-document access, for the embedding and for hooks.
    /// Rendered content under the mount node belongs to the reconciler;
    /// edits there are overwritten on the next cycle.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn snapshot(&self) -> &Value {
        self.store.snapshot()
    }

    /// Resolve a dotted path against the snapshot.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.store.get(path)
    }

    #[must_use]
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    #[must_use]
    pub fn mount_node(&self) -> NodeId {
        self.mount
    }

    /// Stats from the most recent reconciliation pass.
    #[must_use]
    pub fn last_patch(&self) -> PatchStats {
        self.last_patch
    }

    #[must_use]
    pub fn cycle_state(&self) -> CycleState {
        if self.depth == 0 {
            CycleState::Idle
        } else {
            CycleState::Updating
        }
    }

    /// Whether `name` refers to a method, a top-level data key, or nothing.
    #[must_use]
    pub fn resolve_name<'a>(&'a self, name: &str) -> NameRef<'a> {
        if self.methods.contains(name) {
            return NameRef::Method;
        }
        match self.store.snapshot().get(name) {
            Some(value) => NameRef::Data(value),
            None => NameRef::Absent,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────────

    /// Write `value` at `path`. A committed write runs one full update
    /// cycle, then fires the watch entry for the final path segment with
    /// `(new, old, container)`. Loosely-equal writes do nothing.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        match self.store.commit(path, value.into()) {
            WriteOutcome::Committed { previous } => {
                self.run_cycle();
                let key = path.rsplit('.').next().unwrap_or(path);
                if let Some(watch) = self.watches.get(key).cloned() {
                    let new = self.store.get(path).cloned().unwrap_or(Value::Null);
                    let container = self.container_of(path);
                    watch(self, &new, &previous, &container);
                }
            }
            WriteOutcome::Unchanged | WriteOutcome::Rejected => {}
        }
    }

    fn container_of(&self, path: &str) -> Value {
        match path.rsplit_once('.') {
            Some((parent, _)) => self.store.get(parent).cloned().unwrap_or(Value::Null),
            None => self.store.snapshot().clone(),
        }
    }

    // ── Host event entry points ──────────────────────────────────────────

    /// Deliver an event to a node, invoking every matching event binding.
    /// A binding whose method is missing logs an error and the remaining
    /// bindings still run.
    pub fn dispatch(&mut self, node: NodeId, event: EventKind) {
        let hits: Vec<EventBinding> = self
            .bindings
            .events
            .iter()
            .filter(|b| b.node == node && b.event == event)
            .cloned()
            .collect();
        for binding in hits {
            match self.methods.get(&binding.method).cloned() {
                Some(method) => method(self, &binding.args),
                None => {
                    error!(method = binding.method.as_str(), "no method named in methods table");
                }
            }
        }
    }

    /// Simulate the user editing a text-like control: updates the live
    /// value, writes back through the control's `#value` binding with type
    /// coercion, then delivers the `input` event.
    pub fn input(&mut self, node: NodeId, text: &str) {
        self.doc.set_value(node, text);
        let binding = self
            .bindings
            .forms
            .iter()
            .find(|b| b.node == node && !b.kind.is_toggle())
            .cloned();
        if let Some(binding) = binding {
            let coerced = coerce_to_existing(self.store.get(&binding.path), text);
            self.set(&binding.path, coerced);
        }
        self.dispatch(node, EventKind::Input);
    }

    /// Simulate the user toggling a checkbox or radio: flips the checked
    /// state, writes the boolean back through the binding, then delivers
    /// the `change` event. Literal `"true"`/`"false"` markers have no data
    /// location and skip the write-back.
    pub fn toggle(&mut self, node: NodeId) {
        let now = !self.doc.checked(node);
        self.doc.set_checked(node, now);
        let binding = self
            .bindings
            .forms
            .iter()
            .find(|b| b.node == node && b.kind.is_toggle())
            .cloned();
        if let Some(binding) = binding
            && binding.path != "true"
            && binding.path != "false"
        {
            self.set(&binding.path, Value::Bool(now));
        }
        self.dispatch(node, EventKind::Change);
    }

    // ── The cycle ────────────────────────────────────────────────────────

    fn render_initial(&mut self) -> Result<(), ConfigError> {
        let started = Instant::now();
        let compiled = compile(&self.template, self.store.snapshot())?;
        self.doc.clear_children(self.mount);
        parse_into(&mut self.doc, self.mount, &compiled);
        visibility::apply(&mut self.doc, self.mount, self.store.snapshot());
        self.bindings = forms::collect(&mut self.doc, self.mount, self.store.snapshot());
        if self.ctx.strict() {
            self.warn_unbound_methods();
        }
        let took = started.elapsed();
        self.ctx.record_render(took);
        if self.ctx.dev() {
            debug!(?took, "initial render");
        }
        Ok(())
    }

    fn run_cycle(&mut self) {
        let started = Instant::now();
        self.depth += 1;
        let compiled = match compile(&self.template, self.store.snapshot()) {
            Ok(compiled) => compiled,
            // Markers were validated at mount; an error here means the
            // template itself was tampered with. Skip the render, stay live.
            Err(err) => {
                warn!(%err, "template failed to compile, skipping cycle");
                self.depth -= 1;
                return;
            }
        };
        let shadow = parse_fragment(&compiled);
        let stats = reconcile(&mut self.doc, self.mount, &shadow, shadow.root());
        visibility::apply(&mut self.doc, self.mount, self.store.snapshot());
        self.bindings = forms::collect(&mut self.doc, self.mount, self.store.snapshot());
        if self.ctx.strict() {
            self.warn_unbound_methods();
        }
        self.last_patch = stats;
        let took = started.elapsed();
        self.ctx.record_render(took);
        if self.ctx.dev() {
            debug!(
                ?took,
                texts = stats.texts,
                attrs = stats.attrs,
                values = stats.values,
                checked = stats.checked,
                replaced = stats.replaced,
                "update cycle"
            );
        }
        if let Some(hook) = self.after_update.clone() {
            hook(self);
        }
        self.depth -= 1;
    }

    fn warn_unbound_methods(&self) {
        for binding in &self.bindings.events {
            if !self.methods.contains(&binding.method) {
                warn!(
                    method = binding.method.as_str(),
                    event = %binding.event,
                    "event binding references a method that does not exist"
                );
            }
        }
    }
}

/// Reject marker attributes with no expression. The template is immutable,
/// so one check at mount makes every later cycle infallible.
fn validate_markers(template: &str) -> Result<(), ConfigError> {
    let doc = parse_fragment(template);
    let mut stack = vec![doc.root()];
    while let Some(id) = stack.pop() {
        if doc.is_element(id) {
            for attr in doc.attrs(id) {
                let name = attr.name.as_str();
                let is_marker = matches!(name, "#value" | "#show" | "#if")
                    || name
                        .strip_prefix('@')
                        .is_some_and(|n| EventKind::from_name(n).is_some());
                if is_marker && attr.value.trim().is_empty() {
                    return Err(ConfigError::empty_expression(name));
                }
            }
        }
        stack.extend_from_slice(doc.children(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(template: &str) -> Document {
        parse_fragment(&format!(r#"<div id="app">{template}</div>"#))
    }

    #[test]
    fn mount_requires_selector_and_element() {
        let err = App::mount(host("<p>x</p>"), AppOptions::new(json!({})));
        assert_eq!(err.err(), Some(ConfigError::MissingMountSelector));

        let err = App::mount(host("<p>x</p>"), AppOptions::new(json!({})).el("#nope"));
        assert!(matches!(err, Err(ConfigError::MountNotFound { .. })));
    }

    #[test]
    fn mount_rejects_non_object_data() {
        let err = App::mount(host("<p>x</p>"), AppOptions::new(json!([1])).el("#app"));
        assert_eq!(err.err(), Some(ConfigError::NonObjectData));
    }

    #[test]
    fn mount_rejects_empty_marker_expressions() {
        for template in [
            r##"<p #show="">x</p>"##,
            r##"<input #value=" ">"##,
            r##"<button @click="">x</button>"##,
        ] {
            let err = App::mount(host(template), AppOptions::new(json!({})).el("#app"));
            assert!(matches!(err, Err(ConfigError::EmptyExpression { .. })));
        }
    }

    #[test]
    fn initial_render_interpolates() {
        let app = App::mount(
            host("<p>{{greeting}}</p>"),
            AppOptions::new(json!({"greeting": "hi"})).el("#app"),
        )
        .unwrap();
        assert_eq!(
            app.document().inner_markup(app.mount_node()),
            "<p>hi</p>"
        );
    }

    #[test]
    fn set_patches_the_live_tree() {
        let mut app = App::mount(
            host("<p>{{n}}</p>"),
            AppOptions::new(json!({"n": 1})).el("#app"),
        )
        .unwrap();
        app.set("n", 2);
        assert_eq!(app.document().inner_markup(app.mount_node()), "<p>2</p>");
        assert_eq!(app.last_patch().texts, 1);
    }

    #[test]
    fn equal_write_runs_no_cycle() {
        let mut app = App::mount(
            host("<p>{{n}}</p>"),
            AppOptions::new(json!({"n": 1})).el("#app"),
        )
        .unwrap();
        app.set("n", 2);
        let stats = app.last_patch();
        app.set("n", 2);
        // No new cycle: the recorded stats are still the first write's.
        assert_eq!(app.last_patch(), stats);
    }

    #[test]
    fn before_mount_precedes_template_capture() {
        let doc = host("<p>old</p>");
        let app = App::mount(
            doc,
            AppOptions::new(json!({"msg": "new"}))
                .el("#app")
                .before_mount(|app| {
                    let mount = app.mount_node();
                    app.document_mut().clear_children(mount);
                    let doc = app.document_mut();
                    tether_dom::parse_into(doc, mount, "<p>{{msg}}</p>");
                }),
        )
        .unwrap();
        assert_eq!(app.document().inner_markup(app.mount_node()), "<p>new</p>");
    }

    #[test]
    fn resolve_name_distinguishes_tables() {
        let app = App::mount(
            host("<p>x</p>"),
            AppOptions::new(json!({"count": 3}))
                .el("#app")
                .method("save", |_, _| {}),
        )
        .unwrap();
        assert_eq!(app.resolve_name("save"), NameRef::Method);
        assert_eq!(app.resolve_name("count"), NameRef::Data(&json!(3)));
        assert_eq!(app.resolve_name("nope"), NameRef::Absent);
    }
}
