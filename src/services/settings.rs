//! User, system and privacy settings.

use serde_json::{Value, json};

use super::endpoints::settings as endpoints;
use super::invalidate;
use crate::client::ApiClient;
use crate::types::{
    ApiResponse, DeletionRequest, DeletionStatus, NotificationChannel, Preferences,
    PrivacySettings, RequestDescriptor, Settings, SystemSettings, ThemePreset,
};
use crate::Result;

#[derive(Debug, Clone)]
pub struct SettingsService {
    client: ApiClient,
}

impl SettingsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn user_settings(&self) -> Result<ApiResponse<Settings>> {
        self.client.get(endpoints::USER).await
    }

    /// Update user settings. `settings` may be partial.
    pub async fn update_user_settings(&self, settings: &Value) -> Result<ApiResponse<Settings>> {
        let request = RequestDescriptor::put(endpoints::USER).body(settings.clone());
        self.client.mutate(request, invalidate(endpoints::USER)).await
    }

    /// Reset user settings to the backend defaults.
    pub async fn reset_user_settings(&self) -> Result<ApiResponse<Settings>> {
        let request = RequestDescriptor::post(endpoints::USER_RESET);
        self.client.mutate(request, invalidate(endpoints::USER)).await
    }

    /// Admin only.
    pub async fn system_settings(&self) -> Result<ApiResponse<SystemSettings>> {
        self.client.get(endpoints::SYSTEM).await
    }

    /// Admin only.
    pub async fn update_system_settings(&self, settings: &Value) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::put(endpoints::SYSTEM).body(settings.clone());
        self.client.mutate(request, invalidate(endpoints::SYSTEM)).await
    }

    pub async fn preferences(&self) -> Result<ApiResponse<Preferences>> {
        self.client.get(endpoints::PREFERENCES).await
    }

    pub async fn update_preferences(&self, preferences: &Value) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::put(endpoints::PREFERENCES).body(preferences.clone());
        self.client.mutate(request, invalidate(endpoints::PREFERENCES)).await
    }

    pub async fn notification_settings(&self) -> Result<ApiResponse<Value>> {
        self.client.get(endpoints::NOTIFICATIONS).await
    }

    pub async fn update_notification_settings(&self, settings: &Value) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::put(endpoints::NOTIFICATIONS).body(settings.clone());
        self.client.mutate(request, invalidate(endpoints::NOTIFICATIONS)).await
    }

    /// Ask the backend to send a test notification over `channel`.
    pub async fn test_notifications(&self, channel: NotificationChannel) -> Result<ApiResponse<Value>> {
        self.client
            .post(endpoints::NOTIFICATIONS_TEST, &json!({ "type": channel }))
            .await
    }

    pub async fn privacy_settings(&self) -> Result<ApiResponse<PrivacySettings>> {
        self.client.get(endpoints::PRIVACY).await
    }

    pub async fn update_privacy_settings(
        &self,
        settings: &PrivacySettings,
    ) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::put(endpoints::PRIVACY).body(serde_json::to_value(settings)?);
        self.client.mutate(request, invalidate(endpoints::PRIVACY)).await
    }

    pub async fn theme_presets(&self) -> Result<ApiResponse<Vec<ThemePreset>>> {
        self.client.get(endpoints::PRESETS).await
    }

    pub async fn apply_theme_preset(&self, preset_id: &str) -> Result<ApiResponse<Settings>> {
        let request = RequestDescriptor::post(endpoints::apply_preset(preset_id));
        self.client.mutate(request, invalidate(endpoints::USER)).await
    }

    pub async fn save_custom_preset(
        &self,
        name: &str,
        settings: &Value,
    ) -> Result<ApiResponse<ThemePreset>> {
        let request = RequestDescriptor::post(endpoints::PRESETS)
            .body(json!({ "name": name, "settings": settings }));
        self.client.mutate(request, invalidate(endpoints::PRESETS)).await
    }

    pub async fn delete_custom_preset(&self, preset_id: &str) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(endpoints::preset(preset_id));
        self.client.mutate(request, invalidate(endpoints::PRESETS)).await
    }

    /// Settings and preferences as one JSON document.
    pub async fn export_settings(&self) -> Result<ApiResponse<Value>> {
        self.client.get(endpoints::USER_EXPORT).await
    }

    /// Import a document produced by [`export_settings()`](Self::export_settings).
    pub async fn import_settings(&self, document: &Value) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::post(endpoints::USER_IMPORT).body(document.clone());
        self.client.mutate(request, |_| self.clear_cache()).await
    }

    /// Erase the user's stored data.
    pub async fn clear_user_data(&self) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(endpoints::USER_DATA);
        self.client.mutate(request, |_| self.clear_cache()).await
    }

    pub async fn account_deletion_status(&self) -> Result<ApiResponse<DeletionStatus>> {
        self.client.get(endpoints::DELETION).await
    }

    pub async fn request_account_deletion(
        &self,
        password: &str,
    ) -> Result<ApiResponse<DeletionRequest>> {
        let request = RequestDescriptor::post(endpoints::DELETION).body(json!({ "password": password }));
        self.client.mutate(request, invalidate(endpoints::DELETION)).await
    }

    pub async fn cancel_account_deletion(
        &self,
        confirmation_code: &str,
    ) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(endpoints::DELETION)
            .body(json!({ "confirmationCode": confirmation_code }));
        self.client.mutate(request, invalidate(endpoints::DELETION)).await
    }

    /// Drop cached user, system and preference settings.
    pub fn clear_cache(&self) {
        for url in [
            endpoints::USER,
            endpoints::SYSTEM,
            endpoints::PREFERENCES,
            endpoints::NOTIFICATIONS,
            endpoints::PRIVACY,
        ] {
            self.client.invalidate_resource(url);
        }
    }
}
