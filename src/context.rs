//! Device context management
//!
//! Owns the Vulkan instance, physical/logical device, graphics queue, and the
//! command pool used for one-shot transfer submissions. Every resource in this
//! crate is created against a [`DeviceContext`].

use ash::{vk, Device, Entry, Instance};
#[cfg(debug_assertions)]
use ash::extensions::ext::DebugUtils;
use std::ffi::{CStr, CString};

use crate::commands::CommandPool;
use crate::error::{RenderError, RenderResult};

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    /// Vulkan entry point
    pub entry: Entry,
    /// Vulkan instance handle
    pub instance: Instance,
    /// Debug utilities extension (debug builds)
    #[cfg(debug_assertions)]
    debug_utils: Option<DebugUtils>,
    /// Debug messenger handle (debug builds)
    #[cfg(debug_assertions)]
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanInstance {
    /// Create a new headless Vulkan instance
    pub fn new(app_name: &str, enable_validation: bool) -> RenderResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| RenderError::InitializationFailed(format!("Failed to load Vulkan: {e:?}")))?;

        let app_name_cstr = CString::new(app_name)
            .map_err(|e| RenderError::InitializationFailed(format!("Invalid app name: {e}")))?;
        let engine_name_cstr = CString::new("render-core")
            .map_err(|e| RenderError::InitializationFailed(format!("Invalid engine name: {e}")))?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name_cstr)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        #[allow(unused_mut)]
        let mut extensions: Vec<*const i8> = Vec::new();

        #[cfg(debug_assertions)]
        if enable_validation {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layer_names = if cfg!(debug_assertions) && enable_validation {
            vec![CString::new("VK_LAYER_KHRONOS_validation")
                .map_err(|e| RenderError::InitializationFailed(format!("Invalid layer name: {e}")))?]
        } else {
            vec![]
        };
        let layer_names_ptrs: Vec<*const i8> =
            layer_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names_ptrs);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(RenderError::Api)?
        };

        #[cfg(debug_assertions)]
        let (debug_utils, debug_messenger) = if enable_validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let debug_messenger = Self::setup_debug_messenger(&debug_utils)?;
            (Some(debug_utils), Some(debug_messenger))
        } else {
            (None, None)
        };

        Ok(Self {
            entry,
            instance,
            #[cfg(debug_assertions)]
            debug_utils,
            #[cfg(debug_assertions)]
            debug_messenger,
        })
    }

    #[cfg(debug_assertions)]
    fn setup_debug_messenger(debug_utils: &DebugUtils) -> RenderResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(RenderError::Api)
        }
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            #[cfg(debug_assertions)]
            if let (Some(debug_utils), Some(debug_messenger)) =
                (&self.debug_utils, &self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(*debug_messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// Debug callback for validation layers
#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}

/// Physical device selection and capabilities
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Device properties and limits
    pub properties: vk::PhysicalDeviceProperties,
    /// Supported device features
    pub features: vk::PhysicalDeviceFeatures,
    /// Index of the graphics queue family
    pub graphics_family: u32,
}

impl PhysicalDeviceInfo {
    /// Select a device exposing a graphics-capable queue family
    ///
    /// No surface is involved; transfer and barrier submission only need a
    /// graphics queue.
    pub fn select_suitable_device(instance: &Instance) -> RenderResult<Self> {
        let devices = unsafe {
            instance
                .enumerate_physical_devices()
                .map_err(RenderError::Api)?
        };

        for device in devices {
            if let Ok(device_info) = Self::evaluate_device(instance, device) {
                log::info!("Selected GPU: {}", unsafe {
                    CStr::from_ptr(device_info.properties.device_name.as_ptr()).to_string_lossy()
                });
                return Ok(device_info);
            }
        }

        Err(RenderError::InitializationFailed(
            "No suitable GPU found".to_string(),
        ))
    }

    fn evaluate_device(instance: &Instance, device: vk::PhysicalDevice) -> RenderResult<Self> {
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let features = unsafe { instance.get_physical_device_features(device) };
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(device) };

        let graphics_family = queue_families
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .ok_or_else(|| {
                RenderError::InitializationFailed("No graphics queue family found".to_string())
            })?;

        Ok(Self {
            device,
            properties,
            features,
            graphics_family: graphics_family as u32,
        })
    }
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    /// Vulkan logical device handle
    pub device: Device,
    /// Graphics operations queue
    pub graphics_queue: vk::Queue,
    /// Index of the graphics queue family
    pub graphics_family: u32,
}

impl LogicalDevice {
    /// Create a new logical device with a single graphics queue
    pub fn new(instance: &Instance, physical_device_info: &PhysicalDeviceInfo) -> RenderResult<Self> {
        let queue_priorities = [1.0];
        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(physical_device_info.graphics_family)
            .queue_priorities(&queue_priorities)
            .build()];

        let device_features = vk::PhysicalDeviceFeatures::builder()
            .sampler_anisotropy(true)
            .build();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_features(&device_features);

        let device = unsafe {
            instance
                .create_device(physical_device_info.device, &create_info, None)
                .map_err(RenderError::Api)?
        };

        let graphics_queue =
            unsafe { device.get_device_queue(physical_device_info.graphics_family, 0) };

        Ok(Self {
            device,
            graphics_queue,
            graphics_family: physical_device_info.graphics_family,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            // Ensure device is idle before destruction
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// Headless device context owning all core Vulkan resources
///
/// Provides the three things every resource wrapper in this crate needs: the
/// logical device, memory-type lookup against the physical device, and a
/// synchronous one-shot command submission primitive.
pub struct DeviceContext {
    // Dropped in declaration order: pool before device, device before instance
    command_pool: CommandPool,
    /// Logical device and graphics queue
    pub logical_device: LogicalDevice,
    /// Selected physical device information
    pub physical_device: PhysicalDeviceInfo,
    /// Vulkan instance and debug utilities
    pub vulkan_instance: VulkanInstance,
}

impl DeviceContext {
    /// Create a context with validation layers in debug builds
    pub fn new(app_name: &str) -> RenderResult<Self> {
        Self::with_validation(app_name, cfg!(debug_assertions))
    }

    /// Create a context with explicit validation-layer control
    pub fn with_validation(app_name: &str, enable_validation: bool) -> RenderResult<Self> {
        let vulkan_instance = VulkanInstance::new(app_name, enable_validation)?;
        let physical_device = PhysicalDeviceInfo::select_suitable_device(&vulkan_instance.instance)?;
        let logical_device = LogicalDevice::new(&vulkan_instance.instance, &physical_device)?;
        let command_pool = CommandPool::new(
            logical_device.device.clone(),
            logical_device.graphics_family,
        )?;

        Ok(Self {
            command_pool,
            logical_device,
            physical_device,
            vulkan_instance,
        })
    }

    /// Get the raw Device handle
    pub fn device(&self) -> &Device {
        &self.logical_device.device
    }

    /// Get the graphics queue
    pub fn graphics_queue(&self) -> vk::Queue {
        self.logical_device.graphics_queue
    }

    /// Get the physical device handle
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device.device
    }

    /// Find a memory type matching the filter and property flags
    pub fn find_memory_type(
        &self,
        type_filter: u32,
        properties: vk::MemoryPropertyFlags,
    ) -> RenderResult<u32> {
        let memory_properties = unsafe {
            self.vulkan_instance
                .instance
                .get_physical_device_memory_properties(self.physical_device.device)
        };

        for i in 0..memory_properties.memory_type_count {
            if (type_filter & (1 << i)) != 0
                && memory_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
            {
                return Ok(i);
            }
        }

        Err(RenderError::NoSuitableMemoryType)
    }

    /// Record and synchronously submit a one-shot command buffer
    ///
    /// Allocates a primary command buffer from the context's pool, records the
    /// callback, submits to the graphics queue, and waits for queue idle
    /// before freeing the buffer. Completion is implied on return.
    pub fn execute_one_time<F>(&self, record: F) -> RenderResult<()>
    where
        F: FnOnce(vk::CommandBuffer),
    {
        let device = self.device();
        let command_buffer = self.command_pool.allocate_command_buffers(1)?[0];

        let begin_info =
            vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(RenderError::Api)?;
        }

        record(command_buffer);

        unsafe {
            device
                .end_command_buffer(command_buffer)
                .map_err(RenderError::Api)?;
        }

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

        let result = unsafe {
            device
                .queue_submit(
                    self.graphics_queue(),
                    &[submit_info.build()],
                    vk::Fence::null(),
                )
                .map_err(RenderError::Api)
                .and_then(|()| {
                    device
                        .queue_wait_idle(self.graphics_queue())
                        .map_err(RenderError::Api)
                })
        };

        unsafe {
            device.free_command_buffers(self.command_pool.handle(), &command_buffers);
        }

        result
    }
}
