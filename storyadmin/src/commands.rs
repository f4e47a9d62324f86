use std::path::Path;

use storyadmin_client::{
    media::FilePart,
    session::FileTokenStore,
    Api, Resource, Session,
};
use storyadmin_common::{bail, err, time::DateShift, utils::IntoReadable as _, Conf, Report};
use storyadmin_controllers::{ControlError, EditForm, PaginatedList, Phase, SessionGuard, Submitted};

#[derive(clap::ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Stories,
    Chapters,
    Categories,
    Authors,
}

/// Runs an `App` method with the entity type picked on the command line.
macro_rules! dispatch {
    ($kind:expr, $app:ident . $method:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            $crate::commands::ResourceKind::Stories => {
                $app.$method::<storyadmin_client::Story>($($arg),*).await
            }
            $crate::commands::ResourceKind::Chapters => {
                $app.$method::<storyadmin_client::Chapter>($($arg),*).await
            }
            $crate::commands::ResourceKind::Categories => {
                $app.$method::<storyadmin_client::Category>($($arg),*).await
            }
            $crate::commands::ResourceKind::Authors => {
                $app.$method::<storyadmin_client::Author>($($arg),*).await
            }
        }
    };
}

pub(crate) use dispatch;

pub struct App {
    api: Api,
    shift: DateShift,
    page_size: usize,
}

impl App {
    pub fn new(conf: &Conf) -> Result<Self, Report> {
        let session = Session::new(FileTokenStore::new(conf.token_path()));
        let api = Api::connect(&conf.backend()?, session).map_err(report)?;

        Ok(Self {
            api,
            shift: conf.date_shift(),
            page_size: conf.rows_per_page(),
        })
    }

    #[tracing::instrument(skip(self, conf), err)]
    pub async fn login(&self, conf: &Conf) -> Result<(), Report> {
        let username = conf
            .username
            .as_deref()
            .ok_or_else(|| err!("no username configured, set `username` or STORYADMIN_USERNAME"))?;
        let password = conf
            .password
            .as_deref()
            .ok_or_else(|| err!("no password configured, set `password` or STORYADMIN_PASSWORD"))?;

        self.api.auth().login(username, password).await.map_err(report)?;

        println!("signed in as {}", username);

        Ok(())
    }

    pub fn logout(&self) -> Result<(), Report> {
        self.guard()?;

        self.api.auth().logout().map_err(report)?;

        println!("signed out");

        Ok(())
    }

    #[tracing::instrument(skip(self, search), fields(resource = R::PATH), err)]
    pub async fn list<R: Resource>(&self, page: usize, search: Option<&str>) -> Result<(), Report> {
        self.guard()?;

        let list = PaginatedList::new(self.api.resource::<R>(), self.page_size);

        let loaded = match search {
            Some(term) => list.set_filter(term).await,
            None => list.mount().await,
        };
        loaded.map_err(report)?;

        if page != 1 {
            list.go_to(page).await.map_err(report)?;
        }

        let state = list.snapshot();

        for item in &state.items {
            println!("{}\t{}", item.id(), item.title());
        }

        println!(
            "{} {}, page {} of {}",
            state.total.into_readable(),
            R::PATH,
            state.current_page.into_readable(),
            state.total_pages.max(1).into_readable(),
        );

        if state.total_pages > 1 {
            println!("{}", list.pager().render());
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn show<R: Resource>(&self, id: &str) -> Result<(), Report> {
        self.guard()?;

        let raw = self.api.resource::<R>().get_raw(id).await.map_err(report)?;

        println!("{}", serde_json::to_string_pretty(&raw)?);

        Ok(())
    }

    #[tracing::instrument(skip(self, set), fields(resource = R::PATH), err)]
    pub async fn create<R: Resource>(&self, set: &[String]) -> Result<(), Report> {
        self.guard()?;

        let mut form = EditForm::<R>::create(self.api.resource(), self.shift);

        apply(&mut form, set)?;

        match form.submit().await.map_err(report)? {
            Submitted::Created { id, route } => println!("created {} ({})", id, route),
            Submitted::Saved => println!("saved"),
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, set, cover), fields(resource = R::PATH), err)]
    pub async fn edit<R: Resource>(
        &self,
        id: &str,
        set: &[String],
        cover: Option<&Path>,
    ) -> Result<(), Report> {
        self.guard()?;

        let mut form = EditForm::<R>::open(self.api.resource(), id, self.shift).await;

        if let Phase::Failed(err) = form.phase() {
            return Err(report(err.clone()).wrap_err(format!("unable to open `{}`", id)));
        }

        apply(&mut form, set)?;

        if let Some(path) = cover {
            let file = FilePart::read(path).await.map_err(report)?;
            let media = self
                .api
                .media()
                .upload(file, storyadmin_client::media::STORY_COVER)
                .await
                .map_err(report)?;

            form.attach(media).map_err(report)?;
        }

        form.submit().await.map_err(report)?;

        println!("saved {}", id);

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), Report> {
        self.guard()?;

        self.api.resource::<R>().remove(id).await.map_err(report)?;

        println!("deleted {}", id);

        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn upload(&self, file: &Path, entity_type: &str) -> Result<(), Report> {
        self.guard()?;

        let part = FilePart::read(file).await.map_err(report)?;
        let media = self.api.media().upload(part, entity_type).await.map_err(report)?;

        println!("{}\t{}", media.file_id, media.path);

        Ok(())
    }

    fn guard(&self) -> Result<(), Report> {
        SessionGuard::new(self.api.session().clone())
            .enter(|| ())
            .map_err(|route| err!("not signed in, run `storyadmin login` first ({})", route))
    }
}

fn apply<R: Resource>(form: &mut EditForm<R>, set: &[String]) -> Result<(), Report> {
    for pair in set {
        let (name, value) = match pair.split_once('=') {
            Some(split) => split,
            None => bail!("expected `field=value`, got `{}`", pair),
        };

        form.input(name.trim(), value).map_err(report)?;
    }

    Ok(())
}

/// Keeps the underlying error for `-v` output, leads with the operator wording.
fn report(err: impl Into<ControlError>) -> Report {
    let err = err.into();
    let message = err.operator_message();

    Report::new(err).wrap_err(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_wording_leads() {
        let report = report(storyadmin_client::ApiError::Unauthorized);

        assert_eq!(report.to_string(), "Your session has expired, please sign in again.");
        assert_eq!(report.chain().count(), 2);
    }
}
