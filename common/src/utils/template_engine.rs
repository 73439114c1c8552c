pub use minijinja::{path_loader, Environment, Value};
pub use minijinja_autoreload::AutoReloader;
pub use minijinja_contrib;
pub use minijinja_embed;
use std::sync::Arc;

pub trait ProvidesTemplateEngine {
    fn template_engine(&self) -> &Arc<TemplateEngine>;
}

/// Template environment, reloaded from disk in debug builds and embedded into
/// the binary for release builds.
#[derive(Clone)]
pub enum TemplateEngine {
    #[cfg(debug_assertions)]
    AutoReload(Arc<AutoReloader>),
    #[cfg(not(debug_assertions))]
    Embedded(Arc<Environment<'static>>),
}

/// Registers the filters every page template relies on.
pub fn configure_environment(env: &mut Environment<'static>) {
    minijinja_contrib::add_to_environment(env);
    env.add_filter("plural", plural);
}

/// `{{ count | plural("result") }}` -> "1 result" / "3 results".
fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[macro_export]
macro_rules! create_template_engine {
    // Path is relative to the calling crate's manifest
    ($relative_path:expr) => {{
        #[cfg(debug_assertions)]
        {
            let crate_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            let template_path = crate_dir.join($relative_path);
            let reloader = $crate::utils::template_engine::AutoReloader::new(move |notifier| {
                let mut env = $crate::utils::template_engine::Environment::new();
                env.set_loader($crate::utils::template_engine::path_loader(&template_path));
                notifier.set_fast_reload(true);
                notifier.watch_path(&template_path, true);
                $crate::utils::template_engine::configure_environment(&mut env);
                Ok(env)
            });
            $crate::utils::template_engine::TemplateEngine::AutoReload(std::sync::Arc::new(
                reloader,
            ))
        }
        #[cfg(not(debug_assertions))]
        {
            let mut env = $crate::utils::template_engine::Environment::new();
            $crate::utils::template_engine::minijinja_embed::load_templates!(&mut env);
            $crate::utils::template_engine::configure_environment(&mut env);
            $crate::utils::template_engine::TemplateEngine::Embedded(std::sync::Arc::new(env))
        }
    }};
}

impl TemplateEngine {
    fn with_env<R>(
        &self,
        f: impl FnOnce(&Environment<'static>) -> Result<R, minijinja::Error>,
    ) -> Result<R, minijinja::Error> {
        match self {
            #[cfg(debug_assertions)]
            Self::AutoReload(reloader) => {
                let env = reloader.acquire_env()?;
                f(&*env)
            }
            #[cfg(not(debug_assertions))]
            Self::Embedded(env) => f(&**env),
        }
    }

    pub fn render(&self, name: &str, ctx: &Value) -> Result<String, minijinja::Error> {
        self.with_env(|env| env.get_template(name)?.render(ctx))
    }

    /// Renders one block of `template_name`, for htmx fragment swaps.
    pub fn render_block(
        &self,
        template_name: &str,
        block_name: &str,
        context: &Value,
    ) -> Result<String, minijinja::Error> {
        self.with_env(|env| {
            env.get_template(template_name)?
                .render_captured(context)?
                .with_state_mut(|state| state.render_block(block_name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_filter_formats_counts() {
        let mut env = Environment::new();
        configure_environment(&mut env);
        env.add_template("t", "{{ n | plural('attorney') }}")
            .expect("template should parse");
        let tmpl = env.get_template("t").expect("template exists");

        let one = tmpl
            .render(minijinja::context! { n => 1 })
            .expect("render");
        let many = tmpl
            .render(minijinja::context! { n => 4 })
            .expect("render");

        assert_eq!(one, "1 attorney");
        assert_eq!(many, "4 attorneys");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn render_block_returns_only_the_block() {
        let engine = TemplateEngine::AutoReload(Arc::new(AutoReloader::new(|_notifier| {
            let mut env = Environment::new();
            env.add_template(
                "page.html",
                "<main>{% block rows %}{{ count | plural('row') }}{% endblock %}</main>",
            )?;
            configure_environment(&mut env);
            Ok(env)
        })));
        let ctx = minijinja::context! { count => 2 };

        let block = engine
            .render_block("page.html", "rows", &ctx)
            .expect("block renders");
        let page = engine.render("page.html", &ctx).expect("page renders");

        assert_eq!(block, "2 rows");
        assert_eq!(page, "<main>2 rows</main>");
    }
}
